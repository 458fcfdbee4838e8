//! Plain-text rendering of query results for agents.
//!
//! Formatting is total: every [`GraphValue`] has a rendering, so nothing here
//! can fail.

use crate::models::{GraphValue, Node, Path, Properties, Record, Relationship};

/// Text returned when a query yields no records.
pub const NO_RESULTS: &str = "No results found.";

/// Formats a result set.
///
/// ```text
/// Results:
///
/// Record 1:
/// name: Al
/// age: 42
/// ```
pub fn format_results(records: &[Record]) -> String {
    if records.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut output = vec!["Results:".to_string()];
    for (index, record) in records.iter().enumerate() {
        output.push(format!("\nRecord {}:", index + 1));
        for (key, value) in record.iter() {
            output.push(format!("{}: {}", key, format_value(value)));
        }
    }
    output.join("\n")
}

/// Formats a single value.
pub fn format_value(value: &GraphValue) -> String {
    match value {
        GraphValue::Null => "null".to_string(),
        GraphValue::Node(node) => format_node(node),
        GraphValue::Relationship(rel) => format_relationship(rel),
        GraphValue::Path(path) => format_path(path),
        GraphValue::List(items) => format!(
            "[{}]",
            items.iter().map(format_value).collect::<Vec<_>>().join(", ")
        ),
        GraphValue::Map(_) => to_json(value),
        GraphValue::Scalar(scalar) => scalar.to_string(),
    }
}

fn format_node(node: &Node) -> String {
    format!(
        "Node(id={}, labels=[{}], properties={})",
        node.id,
        node.labels.join(", "),
        properties_json(&node.properties)
    )
}

fn format_relationship(rel: &Relationship) -> String {
    format!(
        "Relationship(id={}, type={}, properties={})",
        rel.id,
        rel.rel_type,
        properties_json(&rel.properties)
    )
}

fn format_path(path: &Path) -> String {
    format!("Path(length={}, nodes={})", path.len(), path.len() + 1)
}

fn properties_json(properties: &Properties) -> String {
    serde_json::to_string(properties).unwrap_or_else(|_| "{}".to_string())
}

fn to_json(value: &GraphValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}
