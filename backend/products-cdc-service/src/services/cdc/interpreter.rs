//! Debezium envelope interpretation
//!
//! Maps one untyped JSON document into a typed [`ChangeEvent`]. All shape
//! checks happen here; downstream code only sees typed rows.

use serde_json::{Map, Value};
use tracing::debug;

use super::models::{CdcSource, ChangeEvent, DecimalField, Operation, ProductRow, RowChange, RowKey};
use crate::error::{CdcError, Result};

/// Parse a raw message body and interpret it.
pub fn interpret_bytes(bytes: &[u8]) -> Result<ChangeEvent> {
    let document: Value = serde_json::from_slice(bytes).map_err(CdcError::InvalidJson)?;
    interpret(&document)
}

/// Interpret a parsed Debezium message (schema-wrapped: `{"schema": .., "payload": ..}`).
pub fn interpret(document: &Value) -> Result<ChangeEvent> {
    let payload = document
        .get("payload")
        .ok_or_else(|| CdcError::MalformedEvent("missing 'payload'".to_string()))?
        .as_object()
        .ok_or_else(|| CdcError::MalformedEvent("'payload' is not an object".to_string()))?;

    let op = parse_operation(payload)?;
    let row = snapshot(payload, op)?;

    let change = match op {
        Operation::Create => RowChange::Create(product_row(row)?),
        Operation::Update => RowChange::Update(product_row(row)?),
        Operation::Read => RowChange::Read(product_row(row)?),
        Operation::Delete => RowChange::Delete(RowKey {
            id: extract_id(row)?,
        }),
    };

    let source = payload
        .get("source")
        .and_then(|v| serde_json::from_value::<CdcSource>(v.clone()).ok());
    let ts_ms = payload.get("ts_ms").and_then(Value::as_i64);

    let event = ChangeEvent {
        change,
        source,
        ts_ms,
    };
    debug!(
        op = %op,
        id = event.id(),
        table = event.table().unwrap_or("-"),
        "Interpreted CDC event"
    );
    Ok(event)
}

fn parse_operation(payload: &Map<String, Value>) -> Result<Operation> {
    match payload.get("op") {
        Some(Value::String(code)) => {
            Operation::from_code(code).ok_or_else(|| CdcError::UnknownOperation(code.clone()))
        }
        Some(other) => Err(CdcError::UnknownOperation(other.to_string())),
        None => Err(CdcError::UnknownOperation("<missing>".to_string())),
    }
}

fn snapshot(payload: &Map<String, Value>, op: Operation) -> Result<&Map<String, Value>> {
    let field = op.snapshot_field();
    match payload.get(field) {
        None | Some(Value::Null) => Err(CdcError::MissingSnapshot { op, field }),
        Some(Value::Object(row)) => Ok(row),
        Some(other) => Err(CdcError::MalformedField {
            field,
            reason: format!("expected an object, got {}", type_name(other)),
        }),
    }
}

fn product_row(row: &Map<String, Value>) -> Result<ProductRow> {
    let id = extract_id(row)?;
    let name = extract_name(row)?;
    let price_field: DecimalField = extract_field(row, "price")?;
    let price = price_field.decode();

    Ok(ProductRow {
        id,
        name,
        price: price.value,
        exact_price: price.exact,
    })
}

/// `id` must be integral. JSON floats with no fractional part are accepted.
fn extract_id(row: &Map<String, Value>) -> Result<i64> {
    let value = required(row, "id")?;
    if let Some(id) = value.as_i64() {
        return Ok(id);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(CdcError::MalformedField {
            field: "id",
            reason: format!("expected an integer, got {}", value),
        }),
    }
}

fn extract_name(row: &Map<String, Value>) -> Result<String> {
    match required(row, "name")? {
        Value::String(name) => Ok(name.clone()),
        other => Err(CdcError::MalformedField {
            field: "name",
            reason: format!("expected a string, got {}", type_name(other)),
        }),
    }
}

fn required<'a>(row: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value> {
    row.get(field).ok_or_else(|| CdcError::MalformedField {
        field,
        reason: "missing".to_string(),
    })
}

fn extract_field<T>(row: &Map<String, Value>, field: &'static str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let value = required(row, field)?;
    serde_json::from_value(value.clone()).map_err(|e| CdcError::MalformedField {
        field,
        reason: e.to_string(),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
