//! Payload filter construction for Qdrant requests.

use serde_json::{Value, json};

/// Build an exact-match filter on the `filename` payload field.
///
/// Returns `None` when no filename is given, which Qdrant treats as an unfiltered request.
pub fn build_filename_filter(filename: Option<&str>) -> Option<Value> {
    filename.map(|name| {
        json!({
            "must": [
                {
                    "key": "filename",
                    "match": { "value": name }
                }
            ]
        })
    })
}
