use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use thiserror::Error;

use crate::model::Item;

/// Reasons an import payload never reaches the reconciliation engine.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the file is not valid JSON: {0}")]
    Parse(String),
    #[error("the file does not contain a sequence of items")]
    NotASequence,
    #[error("record {index} is not an item: {reason}")]
    Record { index: usize, reason: String },
}

static ITEM_SCHEMA_JSON: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "category": { "enum": ["Flap", "Body", "Handle", "Accessory", "Combination"] },
            "type": { "enum": ["Flap", "Body", "Handle", "Accessory", "Combination"] },
            "shape": { "enum": ["Square", "Round", "Mini", null] },
            "colors": { "type": "array", "items": { "type": "string" } },
            "color": { "type": "array", "items": { "type": "string" } },
            "price": { "type": "number", "minimum": 0 },
            "purchasePrice": { "type": ["number", "null"], "minimum": 0 },
            "purchase_price": { "type": ["number", "null"], "minimum": 0 },
            "usageCount": { "type": "integer", "minimum": 0 },
            "usage_count": { "type": "integer", "minimum": 0 },
            "isSold": { "type": "boolean" },
            "is_sold": { "type": "boolean" },
            "notes": { "type": ["string", "null"] }
        },
        "required": ["name"],
        "allOf": [
            { "anyOf": [ { "required": ["category"] }, { "required": ["type"] } ] },
            { "anyOf": [ { "required": ["colors"] }, { "required": ["color"] } ] }
        ]
    })
});

static ITEM_SCHEMA: Lazy<JSONSchema> =
    Lazy::new(|| JSONSchema::compile(&ITEM_SCHEMA_JSON).expect("item schema compiles"));

/// Parse an import payload into candidate items, validating each record
/// against the item schema before anything reaches the reconciliation
/// engine. The whole import is rejected on the first offending record;
/// identities carried by the records are kept only so the engine can
/// discard them visibly.
pub fn parse_candidates(text: &str) -> Result<Vec<Item>, ImportError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| ImportError::Parse(err.to_string()))?;
    let records = value.as_array().ok_or(ImportError::NotASequence)?;

    let mut candidates = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if let Err(errors) = ITEM_SCHEMA.validate(record) {
            let reason = errors
                .map(|e| e.to_string())
                .next()
                .unwrap_or_else(|| "schema violation".to_string());
            return Err(ImportError::Record { index, reason });
        }
        let item: Item = serde_json::from_value(record.clone())
            .map_err(|err| ImportError::Record {
                index,
                reason: err.to_string(),
            })?;
        candidates.push(item);
    }
    Ok(candidates)
}
