//! Cypher parser for extracting RETURN clause column names.
//!
//! The driver hands back each row as a map, which loses the column order the
//! query declared. The order is recovered from the query text: the final
//! top-level `RETURN` clause lists the columns in declaration order.
//!
//! # Example
//!
//! ```
//! use neo4j_mcp::graph::cypher::return_columns;
//!
//! let columns = return_columns("MATCH (n) RETURN n.name AS name, n.age");
//! assert_eq!(columns, vec!["name", "n.age"]);
//! ```

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "graph/cypher.pest"]
struct CypherParser;

/// Extracts column names from a Cypher query's final top-level RETURN clause.
///
/// For aliased expressions (`expr AS alias`), returns the alias. For
/// unaliased expressions, returns the expression text. `RETURN *` items,
/// queries without a RETURN clause and queries the grammar cannot tokenize
/// contribute nothing.
pub fn return_columns(query: &str) -> Vec<String> {
    let pairs = match CypherParser::parse(Rule::Cypher, query) {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::debug!(error = %e, "Could not locate RETURN clause");
            return Vec::new();
        }
    };

    pairs
        .flatten()
        .filter(|pair| pair.as_rule() == Rule::Return)
        .last()
        .map(projection_columns)
        .unwrap_or_default()
}

fn projection_columns(ret: Pair<'_, Rule>) -> Vec<String> {
    ret.into_inner()
        .filter(|pair| pair.as_rule() == Rule::ProjectionItems)
        .flat_map(|items| items.into_inner())
        .filter(|pair| pair.as_rule() == Rule::ProjectionItem)
        .map(column_name)
        .collect()
}

/// For `Expression AS Variable`, the variable; otherwise the expression text.
fn column_name(item: Pair<'_, Rule>) -> String {
    let mut expression = None;
    let mut alias = None;

    for inner in item.into_inner() {
        match inner.as_rule() {
            Rule::Expression => expression = Some(inner.as_str().trim().to_string()),
            Rule::Variable => alias = Some(unescape(inner.as_str().trim())),
            _ => {}
        }
    }

    alias.or(expression).unwrap_or_default()
}

fn unescape(name: &str) -> String {
    match name.strip_prefix('`').and_then(|n| n.strip_suffix('`')) {
        Some(inner) => inner.replace("``", "`"),
        None => name.to_string(),
    }
}
