//! Human-readable rendering of serialized expressions.
//!
//! Used by the `Display` impls and log statements only; it is not a wire format. Numbers are
//! written bare, every other scalar is quoted:
//!
//! ```text
//! {"$and": [{"size.h": {"$lt": 15}}, {"size.uom": "in"}, {"active": "true"}]}
//! ```

use bson::{Bson, Document};

/// Renders a document as `{"key": value, ...}`.
pub fn render_document(document: &Document) -> String {
    let entries = document
        .iter()
        .map(|(key, value)| format!("{key:?}: {}", render_value(value)))
        .collect::<Vec<_>>();

    format!("{{{}}}", entries.join(", "))
}

/// Renders a single value.
pub fn render_value(value: &Bson) -> String {
    match value {
        Bson::Document(document) => render_document(document),
        Bson::Array(values) => {
            let values = values.iter().map(render_value).collect::<Vec<_>>();
            format!("[{}]", values.join(", "))
        }
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        Bson::Decimal128(n) => n.to_string(),
        Bson::String(s) => format!("{s:?}"),
        other => format!("\"{other}\""),
    }
}
