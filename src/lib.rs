pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::auth::{authenticate, EnvCredentials, StaticCredentials};
pub use adapters::storage::LocalStorage;
pub use config::{PipelineConfig, StorageBackend};
pub use core::{etl::EtlEngine, pipeline::PricePipeline};
pub use utils::error::{EtlError, Result};
