use csv::{ReaderBuilder, StringRecord};
use uuid::Uuid;

use super::errors::{ProductError, RowParseError};
use super::model::ProductRow;
use super::value_objects::{Price, parse_quantity};

/// Columns every upload row must carry, in order: id, name, image, price, qty.
pub const REQUIRED_COLUMNS: usize = 5;

/// Reference to an upload stored outside the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// What triggered an upload: a stored object to fetch, or the table itself.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestPayload {
    Object(ObjectRef),
    Raw(String),
}

/// A data row of an upload together with its 1-based line in the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub line: u64,
    pub row: Result<ProductRow, RowParseError>,
}

/// Why a row did not make it into the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Parse(RowParseError),
    Upsert(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Parse(err) => write!(f, "{}", err),
            SkipReason::Upsert(err) => write!(f, "row.upsert_failed: {}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Upserted { id: Uuid, cache_mirrored: bool },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub line: u64,
    pub status: RowStatus,
}

/// Per-row outcomes of a committed upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub rows: Vec<RowOutcome>,
}

impl IngestReport {
    pub fn upserted(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r.status, RowStatus::Upserted { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.rows.len() - self.upserted()
    }

    pub fn cache_failures(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    RowStatus::Upserted {
                        cache_mirrored: false,
                        ..
                    }
                )
            })
            .count()
    }
}

/// Splits an upload into data rows.
///
/// The first record is a header and is dropped without looking at it. A payload that is
/// not valid tabular text fails as a whole; a record that is merely invalid is kept as a
/// row-level parse error.
pub fn parse_table(payload: &[u8]) -> Result<Vec<ParsedRow>, ProductError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(payload);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|_| ProductError::MalformedPayload)?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        rows.push(ParsedRow {
            line,
            row: parse_row(&record),
        });
    }

    if rows.is_empty() {
        return Err(ProductError::EmptyInput);
    }
    Ok(rows)
}

fn parse_row(record: &StringRecord) -> Result<ProductRow, RowParseError> {
    if record.len() < REQUIRED_COLUMNS {
        return Err(RowParseError::InsufficientColumns(record.len()));
    }

    let name = &record[1];
    if name.trim().is_empty() {
        return Err(RowParseError::BlankName);
    }
    let price: Price = record[3].parse()?;
    let qty = parse_quantity(&record[4])?;

    let id = match record[0].trim() {
        "" => Uuid::new_v4(),
        raw => Uuid::parse_str(raw).map_err(|_| RowParseError::InvalidId(raw.to_string()))?,
    };
    let image = match &record[2] {
        "" => None,
        image => Some(image.to_string()),
    };

    Ok(ProductRow {
        id,
        name: name.to_string(),
        image,
        price,
        qty,
    })
}
