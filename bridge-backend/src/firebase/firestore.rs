//! Firestore REST shapes and typed-value conversion.
//!
//! Firestore wraps every field in a one-key type object
//! (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...). The bridge
//! works with plain JSON, so values are unwrapped on read and wrapped
//! again when used as query operands.

use bridge_types::{Document, FieldValue};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// A document as returned by the REST API.
#[derive(Debug, Deserialize)]
pub(crate) struct RestDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RestDocument {
    /// Convert to a plain [`Document`]; the id is the last path segment.
    pub fn into_document(self) -> Document {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or(self.name.as_str())
            .to_string();
        Document {
            id,
            fields: decode_fields(&self.fields),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<RestDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ListDocumentsResponse {
    /// Token for the next page; an empty token ends the listing.
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// One element of a `runQuery` response stream.
///
/// Elements without `document` only carry progress (`readTime`, `skippedResults`).
#[derive(Debug, Deserialize)]
pub(crate) struct RunQueryItem {
    #[serde(default)]
    pub document: Option<RestDocument>,
}

/// Body of a single-field equality `runQuery` request.
pub fn equality_query(collection: &str, field: &str, value: &FieldValue) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value),
                }
            }
        }
    })
}

/// Unwrap a map of typed values.
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, FieldValue> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), decode_value(value)))
        .collect()
}

/// Unwrap one typed value. Unknown wrappers are kept as-is.
pub fn decode_value(value: &Value) -> FieldValue {
    let Some(object) = value.as_object() else {
        return value.clone();
    };
    let Some((kind, inner)) = object.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "integerValue" => match inner {
            Value::String(raw) => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| inner.clone()),
            other => other.clone(),
        },
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "bytesValue"
        | "referenceValue" | "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => value.clone(),
    }
}

/// Wrap a plain JSON value in Firestore's typed form.
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({
            "mapValue": {
                "fields": fields
                    .iter()
                    .map(|(name, value)| (name.clone(), encode_value(value)))
                    .collect::<Map<String, Value>>()
            }
        }),
    }
}

/// `PERMISSION_DENIED` -> `permission-denied`.
pub fn status_code(status: &str) -> String {
    status.to_ascii_lowercase().replace('_', "-")
}

/// Fallback code when an error body carries no status.
pub fn http_status_code(status: u16) -> &'static str {
    match status {
        400 => "invalid-argument",
        401 => "unauthenticated",
        403 => "permission-denied",
        404 => "not-found",
        409 => "aborted",
        429 => "resource-exhausted",
        501 => "unimplemented",
        503 => "unavailable",
        504 => "deadline-exceeded",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_scalars() {
        assert_eq!(decode_value(&json!({"stringValue": "Standup"})), json!("Standup"));
        assert_eq!(decode_value(&json!({"integerValue": "42"})), json!(42));
        assert_eq!(decode_value(&json!({"doubleValue": 1.5})), json!(1.5));
        assert_eq!(decode_value(&json!({"booleanValue": true})), json!(true));
        assert_eq!(decode_value(&json!({"nullValue": null})), Value::Null);
        assert_eq!(
            decode_value(&json!({"timestampValue": "2024-05-01T09:00:00Z"})),
            json!("2024-05-01T09:00:00Z")
        );
    }

    #[test]
    fn decodes_nested_values() {
        let wrapped = json!({
            "mapValue": {
                "fields": {
                    "tags": {"arrayValue": {"values": [
                        {"stringValue": "a"},
                        {"integerValue": "7"}
                    ]}},
                    "where": {"geoPointValue": {"latitude": 1.0, "longitude": 2.0}}
                }
            }
        });
        assert_eq!(
            decode_value(&wrapped),
            json!({
                "tags": ["a", 7],
                "where": {"latitude": 1.0, "longitude": 2.0}
            })
        );
    }

    #[test]
    fn empty_array_and_map_decode_to_empty() {
        assert_eq!(decode_value(&json!({"arrayValue": {}})), json!([]));
        assert_eq!(decode_value(&json!({"mapValue": {}})), json!({}));
    }

    #[test]
    fn unknown_wrapper_passes_through() {
        let raw = json!({"vectorValue": [1, 2]});
        assert_eq!(decode_value(&raw), raw);
    }

    #[test]
    fn encodes_operands() {
        assert_eq!(encode_value(&json!("m1")), json!({"stringValue": "m1"}));
        assert_eq!(encode_value(&json!(3)), json!({"integerValue": "3"}));
        assert_eq!(encode_value(&json!(0.5)), json!({"doubleValue": 0.5}));
        assert_eq!(
            encode_value(&json!([true])),
            json!({"arrayValue": {"values": [{"booleanValue": true}]}})
        );
    }

    #[test]
    fn document_id_is_last_path_segment() {
        let doc: RestDocument = serde_json::from_value(json!({
            "name": "projects/demo/databases/(default)/documents/meetings/m1",
            "fields": {"name": {"stringValue": "Standup"}},
            "createTime": "2024-05-01T09:00:00Z"
        }))
        .unwrap();
        let doc = doc.into_document();
        assert_eq!(doc.id, "m1");
        assert_eq!(doc.field("name"), Some(&json!("Standup")));
    }

    #[test]
    fn document_without_fields() {
        let doc: RestDocument =
            serde_json::from_value(json!({"name": "projects/p/databases/d/documents/guests/g1"}))
                .unwrap();
        let doc = doc.into_document();
        assert_eq!(doc.id, "g1");
        assert!(doc.fields.is_empty());
    }

    #[test]
    fn empty_page_token_ends_listing() {
        let page: ListDocumentsResponse =
            serde_json::from_value(json!({"documents": [], "nextPageToken": ""})).unwrap();
        assert_eq!(page.next_page(), None);

        let page: ListDocumentsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn equality_query_shape() {
        let body = equality_query("guests", "meetingId", &json!("m1"));
        assert_eq!(
            body["structuredQuery"]["from"][0]["collectionId"],
            json!("guests")
        );
        let filter = &body["structuredQuery"]["where"]["fieldFilter"];
        assert_eq!(filter["field"]["fieldPath"], json!("meetingId"));
        assert_eq!(filter["op"], json!("EQUAL"));
        assert_eq!(filter["value"], json!({"stringValue": "m1"}));
    }

    #[test]
    fn run_query_items_skip_progress_entries() {
        let items: Vec<RunQueryItem> = serde_json::from_value(json!([
            {"readTime": "2024-05-01T09:00:00Z"},
            {"document": {"name": "a/b/guests/g1", "fields": {}}, "readTime": "2024-05-01T09:00:00Z"}
        ]))
        .unwrap();
        let docs: Vec<_> = items.into_iter().filter_map(|item| item.document).collect();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn status_codes() {
        assert_eq!(status_code("PERMISSION_DENIED"), "permission-denied");
        assert_eq!(status_code("NOT_FOUND"), "not-found");
        assert_eq!(http_status_code(403), "permission-denied");
        assert_eq!(http_status_code(418), "unknown");
    }
}
