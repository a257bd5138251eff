use crate::domain::model::TransformStats;
use crate::domain::ports::Pipeline;
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub object_key: String,
    pub bytes_downloaded: usize,
    pub stats: TransformStats,
}

/// Runs extract, transform and load once, in order, stopping at the first failure.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting ETL process...");

        // Extract
        tracing::info!("⬇️  Downloading source workbook...");
        let payload = self.pipeline.extract().await.map_err(log_failure)?;
        let bytes_downloaded = payload.len();
        tracing::info!("Downloaded {} bytes", bytes_downloaded);

        // Transform
        tracing::info!("🔧 Transforming price sheet...");
        let result = self.pipeline.transform(payload).await.map_err(log_failure)?;
        let stats = result.stats;
        tracing::info!(
            "Kept {} of {} rows",
            stats.rows_kept,
            stats.rows_read
        );

        // Load
        tracing::info!("⬆️  Publishing CSV...");
        let object_key = self.pipeline.load(result).await.map_err(log_failure)?;
        tracing::info!("Object written: {}", object_key);

        Ok(RunReport {
            object_key,
            bytes_downloaded,
            stats,
        })
    }
}

/// Logs a stage failure before it is propagated.
pub fn log_failure(e: EtlError) -> EtlError {
    tracing::error!(stage = %e.stage(), "❌ {}", e);
    e
}
