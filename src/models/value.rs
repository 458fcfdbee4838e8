//! Values returned by graph queries.
//!
//! Every field of a result record is a [`GraphValue`]. The graph-native kinds
//! (node, relationship, path) keep their structure so the formatter can render
//! them with dedicated rules; everything the driver returns that has no
//! dedicated variant ends up as a [`Scalar`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Property map of a node, relationship or nested map value.
///
/// Keys are kept sorted so serialized output is stable.
pub type Properties = BTreeMap<String, GraphValue>;

/// A single value in a result record.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Null,
    Scalar(Scalar),
    Node(Node),
    Relationship(Relationship),
    Path(Path),
    List(Vec<GraphValue>),
    Map(Properties),
}

/// Non-structured values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Driver kinds without a dedicated variant (temporal, spatial, bytes),
    /// kept as their textual rendering.
    Other(String),
}

/// A graph vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "identity")]
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: Properties,
}

/// A graph edge.
///
/// Relationships that appear inside a path carry no endpoint ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    #[serde(rename = "identity")]
    pub id: i64,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    pub properties: Properties,
}

/// A walk through the graph, in traversal order.
///
/// `nodes` always holds one more element than `relationships` for a
/// well-formed path.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// Number of segments (relationships traversed).
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

impl From<bool> for GraphValue {
    fn from(v: bool) -> Self {
        GraphValue::Scalar(Scalar::Boolean(v))
    }
}

impl From<i64> for GraphValue {
    fn from(v: i64) -> Self {
        GraphValue::Scalar(Scalar::Integer(v))
    }
}

impl From<f64> for GraphValue {
    fn from(v: f64) -> Self {
        GraphValue::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for GraphValue {
    fn from(v: &str) -> Self {
        GraphValue::Scalar(Scalar::String(v.to_string()))
    }
}

impl From<String> for GraphValue {
    fn from(v: String) -> Self {
        GraphValue::Scalar(Scalar::String(v))
    }
}

impl From<Node> for GraphValue {
    fn from(v: Node) -> Self {
        GraphValue::Node(v)
    }
}

impl From<Relationship> for GraphValue {
    fn from(v: Relationship) -> Self {
        GraphValue::Relationship(v)
    }
}

impl From<Path> for GraphValue {
    fn from(v: Path) -> Self {
        GraphValue::Path(v)
    }
}

impl<T: Into<GraphValue>> From<Vec<T>> for GraphValue {
    fn from(v: Vec<T>) -> Self {
        GraphValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<GraphValue>> From<Option<T>> for GraphValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(GraphValue::Null)
    }
}

/// String coercion for scalars.
///
/// Floats follow the usual display conventions of agent-facing text: integral
/// values print without a fraction, very large or small magnitudes switch to
/// exponent form (`1e+21`, `1e-7`) and infinities print as `Infinity`.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Boolean(v) => write!(f, "{}", v),
            Scalar::Integer(v) => write!(f, "{}", v),
            Scalar::Float(v) if v.is_infinite() && *v > 0.0 => f.write_str("Infinity"),
            Scalar::Float(v) if v.is_infinite() => f.write_str("-Infinity"),
            Scalar::Float(v) if *v != 0.0 && (v.abs() >= 1e21 || v.abs() < 1e-6) => {
                let text = format!("{:e}", v);
                match text.split_once('e') {
                    Some((mantissa, exp)) if !exp.starts_with('-') => {
                        write!(f, "{}e+{}", mantissa, exp)
                    }
                    _ => f.write_str(&text),
                }
            }
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::String(v) | Scalar::Other(v) => f.write_str(v),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Scalar::Boolean(v) => serializer.serialize_bool(*v),
            Scalar::Integer(v) => serializer.serialize_i64(*v),
            // serde_json writes non-finite floats as null
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::String(v) | Scalar::Other(v) => serializer.serialize_str(v),
        }
    }
}

impl Serialize for GraphValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            GraphValue::Null => serializer.serialize_unit(),
            GraphValue::Scalar(v) => v.serialize(serializer),
            GraphValue::Node(v) => v.serialize(serializer),
            GraphValue::Relationship(v) => v.serialize(serializer),
            GraphValue::Path(v) => v.serialize(serializer),
            GraphValue::List(v) => v.serialize(serializer),
            GraphValue::Map(v) => v.serialize(serializer),
        }
    }
}
