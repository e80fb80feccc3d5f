#[path = "../crates/sdk-types/src/lib.rs"]
pub mod types;
#[path = "../crates/core/src/lib.rs"]
pub mod core;
#[path = "../crates/provider/src/lib.rs"]
pub mod provider;
#[path = "../crates/transports/reqwest/src/lib.rs"]
pub mod transport_reqwest;
#[path = "../crates/storage/src/lib.rs"]
pub mod storage;

#[path = "../crates/providers/laozhang/src/lib.rs"]
pub mod provider_laozhang;

#[path = "../crates/tools/src/lib.rs"]
pub mod tools;
#[path = "../crates/server/src/lib.rs"]
pub mod server;

pub mod transports {
    pub use crate::transport_reqwest as reqwest;
}

pub mod providers {
    pub use crate::provider_laozhang as laozhang;
}

pub(crate) use crate::core as image_gen_core;
pub(crate) use crate::provider as image_gen_provider;
pub(crate) use crate::storage as image_gen_storage;
pub(crate) use crate::transport_reqwest as reqwest_transport;
pub(crate) use crate::types as image_gen_types;
