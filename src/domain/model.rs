use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header names written to the output CSV.
pub const DATE_HEADER: &str = "fecha";
pub const PRICE_HEADER: &str = "precio_interno";

/// One month of the internal price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Always the first day of a month.
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    /// COP per 125 kg load of dry parchment coffee.
    #[serde(rename = "precio_interno")]
    pub internal_price: f64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, internal_price: f64) -> Self {
        Self {
            date,
            internal_price,
        }
    }
}

/// Cleaned series in source sheet order. Duplicated months are kept.
pub type CleanedDataset = Vec<PriceRecord>;

/// Row accounting for one transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub rows_read: usize,
    pub dropped_missing_date: usize,
    pub dropped_invalid_date: usize,
    pub dropped_invalid_price: usize,
    pub rows_kept: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: CleanedDataset,
    pub stats: TransformStats,
}

/// CSV body plus the key it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub key: String,
    pub content: String,
    pub content_type: &'static str,
}
