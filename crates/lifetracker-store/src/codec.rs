//! Conversion between typed records and flat storage items.

use crate::error::CodecError;
use crate::item::{AttributeValue, Item};
use crate::schema::EntitySchema;
use serde_json::{Map, Number, Value};

/// Flattens records into scalar items and back.
///
/// Fields named in [`EntitySchema::NESTED_FIELDS`] are stored as one JSON text
/// attribute each; every other field must be scalar.
pub struct RecordCodec;

impl RecordCodec {
    pub fn encode<S: EntitySchema>(record: &S::Record) -> Result<Item, CodecError> {
        let Value::Object(fields) = serde_json::to_value(record)? else {
            return Err(CodecError::NotAnObject);
        };
        let mut item = Item::new();
        for (field, value) in fields {
            let attribute = if S::NESTED_FIELDS.contains(&field.as_str()) {
                AttributeValue::S(serde_json::to_string(&value)?)
            } else {
                encode_scalar(&field, value)?
            };
            item.insert(field, attribute);
        }
        Ok(item)
    }

    pub fn decode<S: EntitySchema>(item: Item) -> Result<S::Record, CodecError> {
        let mut fields = Map::new();
        for (field, attribute) in item {
            let value = if S::NESTED_FIELDS.contains(&field.as_str()) {
                decode_nested(&field, attribute)?
            } else {
                decode_scalar(attribute)?
            };
            fields.insert(field, value);
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

fn encode_scalar(field: &str, value: Value) -> Result<AttributeValue, CodecError> {
    match value {
        Value::String(text) => Ok(AttributeValue::S(text)),
        Value::Number(number) => Ok(AttributeValue::N(number.to_string())),
        Value::Bool(flag) => Ok(AttributeValue::Bool(flag)),
        Value::Null => Ok(AttributeValue::Null),
        Value::Array(_) | Value::Object(_) => Err(CodecError::UnexpectedStructure {
            field: field.to_string(),
        }),
    }
}

fn decode_scalar(attribute: AttributeValue) -> Result<Value, CodecError> {
    Ok(match attribute {
        AttributeValue::S(text) => Value::String(text),
        AttributeValue::N(text) => Value::Number(serde_json::from_str::<Number>(&text)?),
        AttributeValue::Bool(flag) => Value::Bool(flag),
        AttributeValue::Null => Value::Null,
    })
}

fn decode_nested(field: &str, attribute: AttributeValue) -> Result<Value, CodecError> {
    match attribute {
        AttributeValue::S(text) => {
            serde_json::from_str(&text).map_err(|err| CodecError::InvalidNested {
                field: field.to_string(),
                reason: err.to_string(),
            })
        }
        other => Err(CodecError::InvalidNested {
            field: field.to_string(),
            reason: format!("expected serialized text, found {other:?}"),
        }),
    }
}
