//! Sheet extraction and cleaning for the monthly internal price series.
//!
//! Row policy, applied per data row in sheet order:
//! 1. an empty date cell drops the row;
//! 2. the date is parsed, and a value that is not a date becomes missing;
//! 3. the date is truncated to the first day of its month;
//! 4. the price is coerced to a number, and anything else becomes missing;
//! 5. rows with a missing price, or with a date that went missing in step 2, are dropped.

use crate::domain::model::{PriceRecord, TransformResult, TransformStats};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use std::io::Cursor;

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Where the series lives inside the workbook. Rows and columns are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub sheet_name: String,
    /// Metadata rows above the header row.
    pub skip_rows: u32,
    pub date_column: u32,
    pub price_column: u32,
}

impl SheetLayout {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            sheet_name: config.sheet_name().to_string(),
            skip_rows: config.skip_rows(),
            date_column: config.date_column(),
            price_column: config.price_column(),
        }
    }

    fn header_row(&self) -> u32 {
        self.skip_rows
    }

    fn required_width(&self) -> u32 {
        self.date_column.max(self.price_column) + 1
    }
}

#[derive(Debug, Clone)]
pub struct Transformer {
    layout: SheetLayout,
}

impl Transformer {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Pure function of `payload`: the same bytes always give the same dataset.
    pub fn transform(&self, payload: &[u8]) -> Result<TransformResult> {
        let range = read_sheet(payload, &self.layout.sheet_name)?;
        extract_prices(&range, &self.layout)
    }
}

fn read_sheet(payload: &[u8], sheet_name: &str) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(payload.to_vec())).map_err(|e| {
        EtlError::transform(format!("Payload is not a readable spreadsheet: {}", e))
    })?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet_name) {
        return Err(EtlError::transform(format!(
            "Sheet '{}' not found (available: {})",
            sheet_name,
            sheet_names.join(", ")
        )));
    }

    workbook
        .worksheet_range(sheet_name)
        .map_err(|e| EtlError::transform(format!("Cannot read sheet '{}': {}", sheet_name, e)))
}

/// Applies the row policy to an already loaded sheet.
pub fn extract_prices(range: &Range<Data>, layout: &SheetLayout) -> Result<TransformResult> {
    let (end_row, end_col) = range.end().ok_or_else(|| {
        EtlError::transform(format!("Sheet '{}' is empty", layout.sheet_name))
    })?;

    if end_col + 1 < layout.required_width() {
        return Err(EtlError::transform(format!(
            "Sheet '{}' has {} columns, expected at least {}",
            layout.sheet_name,
            end_col + 1,
            layout.required_width()
        )));
    }

    if end_row < layout.header_row() {
        return Err(EtlError::transform(format!(
            "Sheet '{}' ends at row {} before the header row {}",
            layout.sheet_name,
            end_row + 1,
            layout.header_row() + 1
        )));
    }

    let mut stats = TransformStats::default();
    let mut records = Vec::new();

    for row in (layout.header_row() + 1)..=end_row {
        stats.rows_read += 1;

        let date_cell = range.get_value((row, layout.date_column));
        let date_cell = match date_cell {
            Some(cell) if !is_blank(cell) => cell,
            _ => {
                stats.dropped_missing_date += 1;
                continue;
            }
        };

        let month = parse_date(date_cell).and_then(first_of_month);
        let price = range.get_value((row, layout.price_column)).and_then(parse_price);

        let Some(price) = price else {
            tracing::trace!("Row {}: price {:?} is not numeric", row + 1, range.get_value((row, layout.price_column)));
            stats.dropped_invalid_price += 1;
            continue;
        };

        let Some(month) = month else {
            tracing::trace!("Row {}: date {:?} is not a date", row + 1, date_cell);
            stats.dropped_invalid_date += 1;
            continue;
        };

        records.push(PriceRecord::new(month, price));
    }

    stats.rows_kept = records.len();
    Ok(TransformResult { records, stats })
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Native dates, Excel serial numbers and common text layouts. Anything else is `None`.
pub fn parse_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_text(s),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        // year-month only, e.g. "2024-01"
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d").ok())
}

/// 1900 date system, including Lotus' phantom 1900-02-29 at serial 60.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let days = serial.trunc() as i64;
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_signed(Duration::days(days))
}

pub fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

/// Numeric coercion: numbers pass, numeric text is parsed, everything else is `None`.
pub fn parse_price(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (!value.is_nan()).then_some(value)
}
