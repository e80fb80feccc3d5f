//! Local image storage: collision-safe saving, prompt-derived filenames and listing.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate};
use tracing::debug;

use crate::image_gen_types::image::{GeneratedImage, ImageListItem};

const LISTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "in", "on", "at", "to", "for", "of", "with", "and", "or", "but", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "shall", "can", "very", "really",
    "just", "also", "that", "this", "style", "image", "picture", "photo", "photograph",
    "illustration",
];

/// Directory that generated images are written to and listed from.
#[derive(Debug, Clone)]
pub struct ImageStore {
    output_dir: PathBuf,
}

impl ImageStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.output_dir)
    }

    /// Write `bytes` under `filename`, appending `_1`, `_2`, ... to the stem if taken.
    pub fn save_image(&self, bytes: &[u8], filename: &str) -> io::Result<GeneratedImage> {
        self.ensure_dir()?;
        let requested = Path::new(filename);
        let stem = requested
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("generated");
        let extension = requested
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("jpg");

        let mut path = self.output_dir.join(filename);
        let mut counter = 1u32;
        let mut file = loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    path = self
                        .output_dir
                        .join(format!("{stem}_{counter}.{extension}"));
                    counter += 1;
                }
                Err(e) => return Err(e),
            }
        };
        file.write_all(bytes)?;
        file.flush()?;

        let saved_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());
        debug!(
            target: "image_gen::storage",
            path = %path.display(),
            bytes = bytes.len(),
            "image saved"
        );
        Ok(GeneratedImage {
            path: path.to_string_lossy().into_owned(),
            filename: saved_name,
            size_bytes: bytes.len() as u64,
            size_human: format_file_size(bytes.len() as u64),
        })
    }

    /// Saved images, newest first, at most `limit` entries.
    pub fn list_images(&self, limit: usize) -> io::Result<Vec<ImageListItem>> {
        self.ensure_dir()?;
        let mut found: Vec<(PathBuf, SystemTime, u64)> = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !has_listed_extension(&path) {
                continue;
            }
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((path, modified, meta.len()));
        }
        found.sort_by(|a, b| b.1.cmp(&a.1));
        found.truncate(limit);

        Ok(found
            .into_iter()
            .map(|(path, modified, size)| ImageListItem {
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.to_string_lossy().into_owned(),
                size_bytes: size,
                size_human: format_file_size(size),
                created: DateTime::<Local>::from(modified)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            })
            .collect())
    }
}

fn has_listed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| LISTED_EXTENSIONS.contains(&ext))
}

/// Descriptive filename for a prompt, dated today in local time.
pub fn filename_from_prompt(prompt: &str, suffix: &str) -> String {
    filename_from_prompt_on(prompt, suffix, Local::now().date_naive())
}

/// Like [`filename_from_prompt`] with an explicit date.
pub fn filename_from_prompt_on(prompt: &str, suffix: &str, date: NaiveDate) -> String {
    let cleaned: String = prompt
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut key_words: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.len() > 1 && !STOPWORDS.contains(w))
        .take(5)
        .collect();
    if key_words.is_empty() {
        key_words = words.iter().copied().take(3).collect();
    }
    let name = if key_words.is_empty() {
        "generated".to_string()
    } else {
        key_words.join("_")
    };

    format!("{}_{}{}.jpg", date.format("%Y-%m-%d"), name, suffix)
}

/// Human-readable size with one decimal, base 1024.
pub fn format_file_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

#[cfg(test)]
#[path = "../tests/storage_tests.rs"]
mod storage_tests;
