use crate::adapters::http::Fetcher;
use crate::core::publish::Publisher;
use crate::core::transform::{SheetLayout, Transformer};
use crate::domain::model::TransformResult;
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use chrono::{Local, NaiveDateTime};

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Download the workbook, clean the price sheet, publish it as CSV.
pub struct PricePipeline<S: Storage, C: ConfigProvider> {
    config: C,
    fetcher: Fetcher,
    transformer: Transformer,
    publisher: Publisher<S>,
    clock: fn() -> NaiveDateTime,
}

impl<S: Storage, C: ConfigProvider> PricePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let transformer = Transformer::new(SheetLayout::from_config(&config));
        let publisher = Publisher::new(storage, config.key_prefix(), config.file_stem());
        Self {
            config,
            fetcher: Fetcher::new(),
            transformer,
            publisher,
            clock: local_now,
        }
    }

    /// Replaces the wall clock used for object keys.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PricePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<u8>> {
        self.fetcher.fetch(self.config.source_url()).await
    }

    async fn transform(&self, payload: Vec<u8>) -> Result<TransformResult> {
        let result = self.transformer.transform(&payload)?;
        let stats = &result.stats;
        tracing::debug!(
            "Sheet '{}': {} rows read, {} without date, {} bad date, {} bad price",
            self.transformer.layout().sheet_name,
            stats.rows_read,
            stats.dropped_missing_date,
            stats.dropped_invalid_date,
            stats.dropped_invalid_price
        );
        if result.records.is_empty() {
            tracing::warn!("No valid price rows found, publishing a header-only file");
        }
        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let artifact = self.publisher.publish(&result.records, (self.clock)()).await?;
        Ok(artifact.key)
    }
}
