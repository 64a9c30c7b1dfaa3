use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::error::{json_kind, RecordError};

/// Category assigned to records that don't name one.
pub const DEFAULT_CATEGORY: &str = "misc";

/// Key older files used for the amount.
const LEGACY_AMOUNT_KEY: &str = "ammount";

/// Naive layouts accepted after RFC 3339 fails. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Offset-carrying layouts RFC 3339 parsing rejects (space separator, no colon, basic format).
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y%m%dT%H%M%S%.f%z",
];

/// Date-only layouts, read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

impl Expense {
    /// Create an expense stamped with the current instant.
    pub fn new(description: String, amount: f64, category: String) -> Self {
        Self::at(description, amount, category, Utc::now())
    }

    pub fn at(
        description: String,
        amount: f64,
        category: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            description,
            amount,
            category,
            timestamp,
        }
    }

    /// Case-insensitive category comparison.
    pub fn matches_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }

    /// Encode as a persisted record. The timestamp keeps its `+00:00` offset.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("description".into(), Value::from(self.description.as_str()));
        record.insert("amount".into(), Value::from(self.amount));
        record.insert("category".into(), Value::from(self.category.as_str()));
        record.insert(
            "timestamp".into(),
            Value::from(self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        );
        record
    }

    /// Decode a persisted record, tolerating older layouts.
    ///
    /// Missing fields fall back to defaults: the current instant for
    /// `timestamp`, the legacy `ammount` key and then `0.0` for `amount`,
    /// [`DEFAULT_CATEGORY`] for `category` and an empty `description`.
    /// Timestamps without an offset are taken as UTC, and integer strings
    /// are read as epoch seconds. Only values that cannot be interpreted at
    /// all are rejected.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, RecordError> {
        let timestamp = resolve_timestamp(record.get("timestamp"))?;
        let amount = resolve_amount(record)?;
        let category = optional_str(record, "category")?
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();
        let description = optional_str(record, "description")?
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(Self::at(description, amount, category, timestamp))
    }

    /// Decode an untyped value, rejecting anything that isn't an object.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(record) => Self::from_record(record),
            other => Err(RecordError::NotAnExpense(json_kind(other))),
        }
    }
}

fn resolve_timestamp(raw: Option<&Value>) -> Result<DateTime<Utc>, RecordError> {
    match raw {
        None | Some(Value::Null) => Ok(Utc::now()),
        Some(Value::String(s)) if s.is_empty() => Ok(Utc::now()),
        Some(Value::String(s)) => parse_timestamp(s),
        // A zero timestamp means "unset", like an empty one.
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(Utc::now()),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| RecordError::MalformedTimestamp(n.to_string())),
        Some(_) => Err(RecordError::InvalidField {
            field: "timestamp",
            expected: "a string",
        }),
    }
}

/// Parse ISO-8601 (offset optional, UTC assumed), then integer epoch seconds.
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, RecordError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Some(midnight) = NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(midnight.and_utc());
        }
    }

    let epoch = s
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    match epoch {
        Some(dt) => {
            tracing::debug!("timestamp \"{s}\" read as epoch seconds");
            Ok(dt)
        }
        None => Err(RecordError::MalformedTimestamp(s.to_string())),
    }
}

fn resolve_amount(record: &Map<String, Value>) -> Result<f64, RecordError> {
    let raw = match record.get("amount") {
        Some(value) => value,
        None => match record.get(LEGACY_AMOUNT_KEY) {
            Some(value) => {
                tracing::debug!("amount read from legacy key \"{LEGACY_AMOUNT_KEY}\"");
                value
            }
            None => return Ok(0.0),
        },
    };

    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| RecordError::InvalidAmount(n.to_string())),
        Value::String(s) => parse_amount(s),
        other => Err(RecordError::InvalidAmount(json_kind(other).to_string())),
    }
}

/// Parse a textual amount. Infinities and NaN have no JSON form, so they
/// are rejected along with non-numeric text.
pub fn parse_amount(s: &str) -> Result<f64, RecordError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| RecordError::InvalidAmount(format!("\"{s}\"")))
}

/// A string field that may be missing or null.
fn optional_str<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RecordError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}
