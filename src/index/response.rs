//! Normalization of search responses.
//!
//! Depending on its version the service answers a search with either
//! positional tuples `[distance, id, meta, ...]` or keyed objects
//! `{"id", "distance", "meta"}`. Items are classified one at a time, so a
//! response mixing both still decodes. Items matching neither shape are
//! dropped and counted; metadata that cannot be decoded fails the whole
//! response.

use serde_json::Value;

use super::ranking::RankingPolicy;
use super::{IndexError, Metadata, SearchResult};

/// Distance assumed when a keyed item omits it (similarity 0.0).
pub const DEFAULT_DISTANCE: f64 = 1.0;

/// One item of a search response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponseItem {
    Positional {
        distance: f64,
        id: String,
        meta: Value,
    },
    Keyed {
        id: String,
        distance: Option<f64>,
        meta: Option<Value>,
    },
    Unknown(Value),
}

impl RawResponseItem {
    pub fn classify(item: Value) -> Self {
        match item {
            Value::Array(fields) => Self::classify_positional(fields),
            Value::Object(map) => Self::classify_keyed(map),
            other => RawResponseItem::Unknown(other),
        }
    }

    fn classify_positional(mut fields: Vec<Value>) -> Self {
        if fields.len() < 3 {
            return RawResponseItem::Unknown(Value::Array(fields));
        }
        let distance = fields[0].as_f64();
        let id = id_from_value(&fields[1]);
        let (Some(distance), Some(id)) = (distance, id) else {
            return RawResponseItem::Unknown(Value::Array(fields));
        };
        // Trailing fields beyond the third are ignored.
        let meta = fields.swap_remove(2);
        RawResponseItem::Positional { distance, id, meta }
    }

    fn classify_keyed(mut map: serde_json::Map<String, Value>) -> Self {
        let id = map.get("id").and_then(id_from_value);
        let distance = match map.get("distance") {
            None | Some(Value::Null) => Some(None),
            Some(v) => v.as_f64().map(Some),
        };
        let (Some(id), Some(distance)) = (id, distance) else {
            return RawResponseItem::Unknown(Value::Object(map));
        };
        let meta = map.remove("meta");
        RawResponseItem::Keyed { id, distance, meta }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RawResponseItem::Positional { .. } => "positional",
            RawResponseItem::Keyed { .. } => "keyed",
            RawResponseItem::Unknown(_) => "unknown",
        }
    }

    /// `Ok(None)` for an unknown shape; `Err` when metadata fails to decode.
    pub fn into_result(self) -> Result<Option<SearchResult>, IndexError> {
        let (id, distance, meta) = match self {
            RawResponseItem::Positional { distance, id, meta } => (id, distance, Some(meta)),
            RawResponseItem::Keyed { id, distance, meta } => {
                (id, distance.unwrap_or(DEFAULT_DISTANCE), meta)
            }
            RawResponseItem::Unknown(_) => return Ok(None),
        };
        let metadata = decode_meta(meta.as_ref()).map_err(|e| match e {
            IndexError::Decode(msg) => IndexError::Decode(format!("item {id}: {msg}")),
            other => other,
        })?;
        Ok(Some(SearchResult {
            similarity_score: RankingPolicy::similarity(distance),
            id,
            metadata,
        }))
    }
}

/// Ids are strings on the wire; integer ids are accepted and rendered in
/// decimal.
fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        _ => None,
    }
}

/// Decode the metadata field of a response item.
///
/// Absent, null and empty-string metadata decode to an empty map. A string
/// must hold a JSON object. An object that already arrived structured is
/// taken as is.
pub fn decode_meta(meta: Option<&Value>) -> Result<Metadata, IndexError> {
    match meta {
        None | Some(Value::Null) => Ok(Metadata::new()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Metadata::new()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(IndexError::Decode(format!(
                "metadata must be a JSON object, got {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(IndexError::Decode(format!("metadata is not valid JSON: {e}"))),
        },
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(IndexError::Decode(format!(
            "metadata must be a string or object, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decoded results, unsorted, plus the number of unrecognized items dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub results: Vec<SearchResult>,
    pub skipped: usize,
}

/// Decode a full search response body. The body must be a JSON array.
pub fn normalize(body: Value) -> Result<Normalized, IndexError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(IndexError::Decode(format!(
                "expected a JSON array of results, got {}",
                json_type_name(&other)
            )))
        }
    };

    let mut normalized = Normalized {
        results: Vec::with_capacity(items.len()),
        skipped: 0,
    };
    for (position, item) in items.into_iter().enumerate() {
        let raw = RawResponseItem::classify(item);
        if let RawResponseItem::Unknown(value) = &raw {
            tracing::warn!(
                position,
                item_type = json_type_name(value),
                "skipping search response item of unknown shape"
            );
        }
        match raw.into_result()? {
            Some(result) => normalized.results.push(result),
            None => normalized.skipped += 1,
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_positional_item() {
        let raw = RawResponseItem::classify(json!([0.2, "doc1", "{\"k\":1}"]));
        assert_eq!(raw.kind(), "positional");
        let result = raw.into_result().unwrap().unwrap();
        assert_eq!(result.id, "doc1");
        assert!(approx(result.similarity_score, 0.8));
        assert_eq!(result.metadata.get("k"), Some(&json!(1)));
    }

    #[test]
    fn test_positional_item_ignores_trailing_fields() {
        let raw = RawResponseItem::classify(json!([0.1, "doc1", "{}", [1.0, 2.0], "extra"]));
        let result = raw.into_result().unwrap().unwrap();
        assert_eq!(result.id, "doc1");
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn test_short_or_mistyped_tuples_are_unknown() {
        for item in [
            json!([0.2, "doc1"]),
            json!(["0.2", "doc1", "{}"]),
            json!([0.2, null, "{}"]),
            json!([]),
        ] {
            let raw = RawResponseItem::classify(item.clone());
            assert_eq!(raw.kind(), "unknown", "item {item} should be unknown");
            assert_eq!(raw.into_result().unwrap(), None);
        }
    }

    #[test]
    fn test_keyed_item() {
        let raw = RawResponseItem::classify(json!({
            "id": "doc2",
            "distance": 0.5,
            "meta": "{\"k\":2}"
        }));
        assert_eq!(raw.kind(), "keyed");
        let result = raw.into_result().unwrap().unwrap();
        assert_eq!(result.id, "doc2");
        assert!(approx(result.similarity_score, 0.5));
        assert_eq!(result.metadata.get("k"), Some(&json!(2)));
    }

    #[test]
    fn test_keyed_item_defaults() {
        let result = RawResponseItem::classify(json!({"id": "doc3"}))
            .into_result()
            .unwrap()
            .unwrap();
        assert!(approx(result.similarity_score, 0.0));
        assert!(result.metadata.is_empty());

        let result = RawResponseItem::classify(json!({"id": "doc4", "distance": null, "meta": ""}))
            .into_result()
            .unwrap()
            .unwrap();
        assert!(approx(result.similarity_score, 0.0));
        assert!(result.metadata.is_empty());
    }

    #[test]
    fn test_keyed_item_without_id_is_unknown() {
        let raw = RawResponseItem::classify(json!({"distance": 0.1, "meta": "{}"}));
        assert_eq!(raw.kind(), "unknown");
    }

    #[test]
    fn test_keyed_item_with_non_numeric_distance_is_unknown() {
        let raw = RawResponseItem::classify(json!({"id": "d", "distance": "close"}));
        assert_eq!(raw.kind(), "unknown");
    }

    #[test]
    fn test_integer_ids_are_accepted() {
        let result = RawResponseItem::classify(json!([0.0, 42, ""]))
            .into_result()
            .unwrap()
            .unwrap();
        assert_eq!(result.id, "42");
    }

    #[test]
    fn test_scalar_items_are_unknown() {
        assert_eq!(RawResponseItem::classify(json!("doc")).kind(), "unknown");
        assert_eq!(RawResponseItem::classify(json!(3)).kind(), "unknown");
    }

    #[test]
    fn test_negative_similarity_is_not_clamped() {
        let result = RawResponseItem::classify(json!([1.75, "far", ""]))
            .into_result()
            .unwrap()
            .unwrap();
        assert!(approx(result.similarity_score, -0.75));
    }

    #[test]
    fn test_decode_meta_variants() {
        assert!(decode_meta(None).unwrap().is_empty());
        assert!(decode_meta(Some(&Value::Null)).unwrap().is_empty());
        assert!(decode_meta(Some(&json!(""))).unwrap().is_empty());
        assert_eq!(
            decode_meta(Some(&json!({"a": 1}))).unwrap().get("a"),
            Some(&json!(1))
        );
        assert!(matches!(
            decode_meta(Some(&json!("{not json"))),
            Err(IndexError::Decode(_))
        ));
        assert!(matches!(
            decode_meta(Some(&json!("[1, 2]"))),
            Err(IndexError::Decode(_))
        ));
        assert!(matches!(
            decode_meta(Some(&json!(17))),
            Err(IndexError::Decode(_))
        ));
    }

    #[test]
    fn test_normalize_mixed_shapes() {
        let body = json!([
            [0.2, "doc1", "{\"k\":1}"],
            {"id": "doc2", "distance": 0.5, "meta": "{\"k\":2}"}
        ]);
        let normalized = normalize(body).unwrap();
        assert_eq!(normalized.skipped, 0);
        assert_eq!(normalized.results.len(), 2);
        assert_eq!(normalized.results[0].id, "doc1");
        assert_eq!(normalized.results[1].id, "doc2");
    }

    #[test]
    fn test_normalize_skips_unknown_items() {
        let body = json!([
            [0.2, "doc1", ""],
            "garbage",
            {"score": 0.9},
            {"id": "doc2", "distance": 0.3}
        ]);
        let normalized = normalize(body).unwrap();
        assert_eq!(normalized.skipped, 2);
        let ids: Vec<&str> = normalized.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["doc1", "doc2"]);
    }

    #[test]
    fn test_normalize_fails_on_malformed_metadata() {
        let body = json!([
            [0.2, "doc1", "{\"k\":1}"],
            [0.3, "doc2", "{broken"]
        ]);
        match normalize(body).unwrap_err() {
            IndexError::Decode(msg) => assert!(msg.contains("doc2"), "got: {msg}"),
            other => panic!("expected Decode, got: {other}"),
        }
    }

    #[test]
    fn test_normalize_rejects_non_array_body() {
        assert!(matches!(
            normalize(json!({"results": []})),
            Err(IndexError::Decode(_))
        ));
    }

    #[test]
    fn test_normalize_empty_array() {
        assert_eq!(normalize(json!([])).unwrap(), Normalized::default());
    }
}
