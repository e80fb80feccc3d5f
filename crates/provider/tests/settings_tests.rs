use crate::image_gen_provider::{
    expand_home, Credentials, Settings, SettingsError, API_KEY_VAR, DEFAULT_GRAPHICS_FOLDER,
    GRAPHICS_FOLDER_VAR, VAULT_PATH_VAR,
};
use std::collections::HashMap;
use std::path::PathBuf;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn api_key_is_required() {
    let err = Settings::from_lookup(lookup(&[])).unwrap_err();
    assert_eq!(err, SettingsError::MissingApiKey { var: API_KEY_VAR });
    assert_eq!(
        err.to_string(),
        "LAOZHANG_API_KEY environment variable is required"
    );

    let blank = Settings::from_lookup(lookup(&[(API_KEY_VAR, "   ")])).unwrap_err();
    assert!(matches!(blank, SettingsError::MissingApiKey { .. }));
}

#[test]
fn explicit_paths_are_used_verbatim() {
    let settings = Settings::from_lookup(lookup(&[
        (API_KEY_VAR, "sk-test"),
        (VAULT_PATH_VAR, "/srv/vault"),
        (GRAPHICS_FOLDER_VAR, "renders"),
    ]))
    .expect("settings");
    assert_eq!(settings.credentials, Credentials::ApiKey("sk-test".into()));
    assert_eq!(settings.output_dir(), PathBuf::from("/srv/vault/renders"));
}

#[test]
fn defaults_apply_when_paths_missing() {
    let settings =
        Settings::from_lookup(lookup(&[(API_KEY_VAR, "sk-test")])).expect("settings");
    assert_eq!(settings.graphics_folder, DEFAULT_GRAPHICS_FOLDER);
    assert!(settings.vault_path.is_absolute());
    assert!(settings
        .output_dir()
        .ends_with("Obsidian/VAULTS/Trinity/110 Assets/AI graphics"));
}

#[test]
fn tilde_is_expanded_only_as_prefix() {
    let home = expand_home("~").expect("home");
    assert_eq!(expand_home("~/pics").expect("expanded"), home.join("pics"));
    assert_eq!(
        expand_home("/tmp/~/x").expect("untouched"),
        PathBuf::from("/tmp/~/x")
    );
    assert_eq!(
        expand_home("~other/x").expect("untouched"),
        PathBuf::from("~other/x")
    );
}

#[test]
fn credentials_render_bearer_and_hide_secrets() {
    assert_eq!(
        Credentials::ApiKey("abc".into()).as_bearer().as_deref(),
        Some("Bearer abc")
    );
    assert_eq!(
        Credentials::Bearer("Bearer xyz".into()).as_bearer().as_deref(),
        Some("Bearer xyz")
    );
    assert_eq!(Credentials::None.as_bearer(), None);
    assert_eq!(Credentials::ApiKey(String::new()).as_bearer(), None);
    assert_eq!(
        format!("{:?}", Credentials::ApiKey("abc".into())),
        "ApiKey(<redacted>)"
    );
}
