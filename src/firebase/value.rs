//! Firestore typed value encoding.
//!
//! Firestore's REST surface wraps every value in a single-key object naming
//! its type (`{"stringValue": "x"}`, `{"mapValue": {"fields": {..}}}`, ...).
//! These functions convert between that form and plain JSON.

use serde_json::{Map, Number, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::store::StoreError;

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;

/// Encode plain JSON as a Firestore value.
#[must_use]
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            if values.is_empty() { json!({ "arrayValue": {} }) } else { json!({ "arrayValue": { "values": values } }) }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        json!({ "integerValue": i.to_string() })
    } else if let Some(u) = n.as_u64() {
        json!({ "integerValue": u.to_string() })
    } else {
        json!({ "doubleValue": n.as_f64().unwrap_or_default() })
    }
}

/// Encode each entry of a JSON object, producing a document `fields` map.
#[must_use]
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), encode(v))).collect())
}

/// Decode a Firestore value into plain JSON.
///
/// Integers become JSON integers and timestamps become epoch milliseconds.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] for unknown or ill-formed value types.
pub fn decode(value: &Value) -> Result<Value, StoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Err(StoreError::Malformed(format!("not a typed value: {value}")));
    };
    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" | "stringValue" | "referenceValue" | "bytesValue" | "geoPointValue" => {
            Ok(inner.clone())
        }
        "integerValue" => decode_integer(inner),
        "timestampValue" => decode_timestamp(inner),
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
            values.iter().map(decode).collect::<Result<Vec<_>, _>>().map(Value::Array)
        }
        "mapValue" => decode_fields(inner.get("fields").unwrap_or(&Value::Null)),
        other => Err(StoreError::Malformed(format!("unknown value type {other}"))),
    }
}

/// Decode a document `fields` map into a JSON object. A missing map is an
/// empty object.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] if any field fails to decode.
pub fn decode_fields(fields: &Value) -> Result<Value, StoreError> {
    let Some(map) = fields.as_object() else {
        return Ok(Value::Object(Map::new()));
    };
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        out.insert(key.clone(), decode(value)?);
    }
    Ok(Value::Object(out))
}

fn decode_integer(inner: &Value) -> Result<Value, StoreError> {
    let parsed = match inner {
        Value::String(s) => s.parse::<i64>().map_err(|e| StoreError::Malformed(format!("integerValue {s}: {e}")))?,
        Value::Number(n) => n.as_i64().ok_or_else(|| StoreError::Malformed(format!("integerValue {n}")))?,
        other => return Err(StoreError::Malformed(format!("integerValue {other}"))),
    };
    Ok(Value::from(parsed))
}

fn decode_timestamp(inner: &Value) -> Result<Value, StoreError> {
    let text = inner.as_str().ok_or_else(|| StoreError::Malformed(format!("timestampValue {inner}")))?;
    let at = OffsetDateTime::parse(text, &Rfc3339).map_err(|e| StoreError::Malformed(format!("timestampValue {text}: {e}")))?;
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis)
        .map(Value::from)
        .map_err(|_| StoreError::Malformed(format!("timestampValue {text} out of range")))
}
