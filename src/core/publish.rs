use crate::domain::model::{OutputArtifact, PriceRecord, DATE_HEADER, PRICE_HEADER};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Header row plus one line per record, in order. No index column.
pub fn render_csv(records: &[PriceRecord]) -> Result<String> {
    // header is written by hand so an empty dataset still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record([DATE_HEADER, PRICE_HEADER])
        .map_err(|e| EtlError::publish_with("Cannot write CSV header", e))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| EtlError::publish_with("Cannot serialize price record", e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::publish(format!("Cannot flush CSV buffer: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| EtlError::publish_with("CSV output is not UTF-8", e))
}

/// `<prefix>/<stem>_<YYYYMMDD_HHMMSS>.csv`
pub fn object_key(prefix: &str, stem: &str, now: NaiveDateTime) -> String {
    format!("{}/{}_{}.csv", prefix, stem, now.format("%Y%m%d_%H%M%S"))
}

pub struct Publisher<S: Storage> {
    storage: S,
    key_prefix: String,
    file_stem: String,
}

impl<S: Storage> Publisher<S> {
    pub fn new(storage: S, key_prefix: impl Into<String>, file_stem: impl Into<String>) -> Self {
        Self {
            storage,
            key_prefix: key_prefix.into(),
            file_stem: file_stem.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes exactly one new object. `now` is the upload time used in the key.
    pub async fn publish(&self, records: &[PriceRecord], now: NaiveDateTime) -> Result<OutputArtifact> {
        let artifact = OutputArtifact {
            key: object_key(&self.key_prefix, &self.file_stem, now),
            content: render_csv(records)?,
            content_type: CSV_CONTENT_TYPE,
        };

        tracing::debug!(
            "Uploading {} bytes to {}/{}",
            artifact.content.len(),
            self.storage.location(),
            artifact.key
        );
        self.storage
            .put_object(
                &artifact.key,
                artifact.content.clone().into_bytes(),
                artifact.content_type,
            )
            .await?;

        Ok(artifact)
    }
}
