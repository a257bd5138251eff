use crate::config::{PipelineConfig, StorageBackend};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Every flag is optional: a bare invocation runs the weekly job with its defaults.
#[derive(Debug, Clone, Parser)]
#[command(name = "cafe-etl")]
#[command(about = "Download the monthly internal coffee price series and publish it as CSV")]
pub struct CliArgs {
    #[arg(long, help = "TOML file with pipeline settings")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, help = "Object store to publish to")]
    pub backend: Option<StorageBackend>,

    #[arg(long, help = "Destination bucket (gcs/s3)")]
    pub bucket: Option<String>,

    #[arg(long, help = "Destination directory for the local backend")]
    pub output_dir: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "CAFE_ETL_LOG_JSON", help = "Emit JSON log lines")]
    pub json_logs: bool,
}

impl CliArgs {
    /// Config file and environment first, flags last.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref())?;

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(bucket) = &self.bucket {
            config.bucket = bucket.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
            // --output-dir alone implies a local dry run
            if self.backend.is_none() {
                config.backend = StorageBackend::Local;
            }
        }

        Ok(config)
    }
}
