use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use super::decimal::{self, DecodedDecimal, ExactDecimal};

/// CDC operation types from Debezium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Insert operation (c = create)
    Create,
    /// Update operation (u = update)
    Update,
    /// Read operation (r = read, initial snapshot)
    Read,
    /// Delete operation (d = delete)
    Delete,
}

impl Operation {
    /// Map a Debezium `op` code. Returns `None` for anything unrecognised.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(Self::Create),
            "u" => Some(Self::Update),
            "r" => Some(Self::Read),
            "d" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Lowercase name, used as a metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Read => "read",
            Self::Delete => "delete",
        }
    }

    /// Snapshot that carries the row for this operation
    pub fn snapshot_field(&self) -> &'static str {
        match self {
            Self::Delete => "before",
            Self::Create | Self::Update | Self::Read => "after",
        }
    }
}

/// Debezium `VariableScaleDecimal` struct: `{"scale": 2, "value": "BBo="}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecimalField {
    /// base64 of the unscaled value's two's-complement big-endian bytes
    pub value: String,
    /// Non-negative integer; integral floats such as `2.0` are accepted
    #[serde(deserialize_with = "deserialize_scale")]
    pub scale: u32,
}

impl DecimalField {
    pub fn new(value: impl Into<String>, scale: u32) -> Self {
        Self {
            value: value.into(),
            scale,
        }
    }

    /// Best-effort decode; malformed base64 yields a zero fallback.
    pub fn decode(&self) -> DecodedDecimal {
        decimal::decode(&self.value, self.scale)
    }
}

fn deserialize_scale<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(scale) = number.as_u64() {
        return u32::try_from(scale)
            .map_err(|_| D::Error::custom(format!("scale {} out of range", number)));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(D::Error::custom(format!(
            "scale must be a non-negative integer, got {}",
            number
        ))),
    }
}

/// Row image of the `products` table for create/update/read events
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    /// Exact price, absent when the encoded decimal was unreadable
    pub exact_price: Option<ExactDecimal>,
}

/// Key-only row image carried by delete events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowKey {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowChange {
    Create(ProductRow),
    Update(ProductRow),
    Read(ProductRow),
    Delete(RowKey),
}

impl RowChange {
    pub fn operation(&self) -> Operation {
        match self {
            RowChange::Create(_) => Operation::Create,
            RowChange::Update(_) => Operation::Update,
            RowChange::Read(_) => Operation::Read,
            RowChange::Delete(_) => Operation::Delete,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            RowChange::Create(row) | RowChange::Update(row) | RowChange::Read(row) => row.id,
            RowChange::Delete(key) => key.id,
        }
    }

    /// Full row image, `None` for deletes
    pub fn row(&self) -> Option<&ProductRow> {
        match self {
            RowChange::Create(row) | RowChange::Update(row) | RowChange::Read(row) => Some(row),
            RowChange::Delete(_) => None,
        }
    }
}

/// Debezium `source` block. Every field is optional since connectors differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CdcSource {
    /// Debezium connector version
    pub version: Option<String>,

    /// Connector type (e.g., "postgresql")
    pub connector: Option<String>,

    /// Logical name of the database server
    pub name: Option<String>,

    /// Timestamp in milliseconds
    pub ts_ms: Option<i64>,

    /// Database name
    pub db: Option<String>,

    /// Schema name (for PostgreSQL)
    pub schema: Option<String>,

    /// Table name
    pub table: Option<String>,
}

/// One interpreted change event
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub change: RowChange,
    pub source: Option<CdcSource>,
    /// Time Debezium processed the event, milliseconds since epoch
    pub ts_ms: Option<i64>,
}

impl ChangeEvent {
    pub fn new(change: RowChange) -> Self {
        Self {
            change,
            source: None,
            ts_ms: None,
        }
    }

    pub fn operation(&self) -> Operation {
        self.change.operation()
    }

    pub fn id(&self) -> i64 {
        self.change.id()
    }

    /// Source table name, when the event carried a `source` block
    pub fn table(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.table.as_deref())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
