//! Neo4j backend over the Bolt protocol.
//!
//! [`Neo4jClient`] owns a single `neo4rs::Graph` for the lifetime of the
//! process; the driver pools connections internally. Each [`Neo4jSession`]
//! runs its query in an auto-commit transaction on a pooled connection and
//! collects every row. Closing the session releases its handle on the pool.
//!
//! # Example
//!
//! ```ignore
//! use neo4j_mcp::graph::backends::neo4j::Neo4jClient;
//! use neo4j_mcp::graph::{GraphClient, Params};
//!
//! let client = Neo4jClient::connect(&config).await?;
//! let mut session = client.session().await?;
//! let records = session.run("RETURN 1 AS one", Params::new()).await?;
//! session.close().await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use neo4rs::{
    query, BoltBoolean, BoltDuration, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNode,
    BoltNull, BoltPath, BoltString, BoltType, ConfigBuilder, Graph, Query, Row,
};
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::AppError;
use crate::graph::cypher::return_columns;
use crate::graph::traits::{GraphClient, Session};
use crate::graph::Params;
use crate::models::{GraphValue, Node, Path, Properties, Record, Relationship, Scalar};

/// Neo4j connection handle.
///
/// Authenticates with basic auth. The driver connects lazily, so a wrong
/// password or an unreachable host only shows up when the first session is
/// opened.
pub struct Neo4jClient {
    graph: Graph,
    uri: String,
    closed: AtomicBool,
}

impl Neo4jClient {
    /// Creates the connection handle from validated configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let mut builder = ConfigBuilder::default()
            .uri(config.connection.uri.as_str())
            .user(config.connection.user.as_str())
            .password(config.connection.password.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size);
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }

        let graph = Graph::connect(builder.build()?).await?;

        tracing::info!(
            uri = %config.connection.uri,
            database = config.database.as_deref().unwrap_or("<default>"),
            max_connections = config.max_connections,
            "Created Neo4j connection"
        );

        Ok(Self {
            graph,
            uri: config.connection.uri.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    async fn session(&self) -> Result<Box<dyn Session>, AppError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(AppError::ConnectionClosed);
        }

        tracing::debug!("Opened Neo4j session");
        Ok(Box::new(Neo4jSession {
            graph: Some(self.graph.clone()),
        }))
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        // The pool itself is released when the last handle is dropped.
        tracing::info!(uri = %self.uri, "Closed Neo4j connection");
    }
}

/// A single-query session holding a handle on the connection pool.
///
/// Queries are sent verbatim in auto-commit mode, so statements that manage
/// their own transactions (`CALL { ... } IN TRANSACTIONS`) are accepted.
pub struct Neo4jSession {
    graph: Option<Graph>,
}

#[async_trait]
impl Session for Neo4jSession {
    async fn run(&mut self, cypher: &str, params: Params) -> Result<Vec<Record>, AppError> {
        let graph = self.graph.as_ref().ok_or(AppError::ConnectionClosed)?;
        let columns = return_columns(cypher);

        fetch_all(graph, build_query(cypher, params), &columns).await
    }

    async fn close(mut self: Box<Self>) -> Result<(), AppError> {
        if self.graph.take().is_some() {
            tracing::debug!("Closed Neo4j session");
        }
        Ok(())
    }
}

impl Drop for Neo4jSession {
    fn drop(&mut self) {
        if self.graph.is_some() {
            tracing::warn!("Neo4jSession dropped without close");
        }
    }
}

/// Runs `query` in auto-commit mode and drains the result stream. The pooled
/// connection goes back to the pool when the stream is dropped.
async fn fetch_all(
    graph: &Graph,
    query: Query,
    columns: &[String],
) -> Result<Vec<Record>, AppError> {
    let mut stream = graph.execute(query).await.map_err(AppError::database)?;

    let mut records = Vec::new();
    while let Some(row) = stream.next().await.map_err(AppError::database)? {
        records.push(row_to_record(&row, columns)?);
    }
    Ok(records)
}

fn build_query(cypher: &str, params: Params) -> Query {
    params
        .into_iter()
        .fold(query(cypher), |q, (key, value)| {
            q.param(&key, json_to_bolt(value))
        })
}

/// Converts a driver row into a [`Record`].
///
/// Fields named in the query's RETURN clause come first, in that order; any
/// other fields follow sorted by name.
fn row_to_record(row: &Row, columns: &[String]) -> Result<Record, AppError> {
    let fields: HashMap<String, BoltType> = row.to().map_err(AppError::database)?;
    Ok(order_fields(
        fields.into_iter().map(|(k, v)| (k, bolt_to_value(v))),
        columns,
    ))
}

fn order_fields(fields: impl IntoIterator<Item = (String, GraphValue)>, columns: &[String]) -> Record {
    let mut remaining: Vec<(String, GraphValue)> = fields.into_iter().collect();
    remaining.sort_by(|a, b| a.0.cmp(&b.0));

    let mut record = Record::new();
    for column in columns {
        if let Some(pos) = remaining.iter().position(|(name, _)| name == column) {
            let (name, value) = remaining.remove(pos);
            record.push(name, value);
        }
    }
    for (name, value) in remaining {
        record.push(name, value);
    }
    record
}

// ----------------------------------------------------------------------------
// JSON parameters -> Bolt
// ----------------------------------------------------------------------------

/// Converts a JSON parameter value into its Bolt equivalent.
///
/// Integers that fit in an `i64` stay integers; every other number is sent as
/// a float.
pub fn json_to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::Boolean(BoltBoolean::new(b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or(f64::NAN))),
        },
        JsonValue::String(s) => BoltType::String(BoltString::from(s)),
        JsonValue::Array(items) => BoltType::List(BoltList {
            value: items.into_iter().map(json_to_bolt).collect(),
        }),
        JsonValue::Object(map) => BoltType::Map(BoltMap {
            value: map
                .into_iter()
                .map(|(k, v)| (BoltString::from(k), json_to_bolt(v)))
                .collect(),
        }),
    }
}

// ----------------------------------------------------------------------------
// Bolt -> GraphValue
// ----------------------------------------------------------------------------

/// Converts a Bolt value returned by the driver into a [`GraphValue`].
pub fn bolt_to_value(value: BoltType) -> GraphValue {
    match value {
        BoltType::Null(_) => GraphValue::Null,
        BoltType::Boolean(b) => GraphValue::Scalar(Scalar::Boolean(b.value)),
        BoltType::Integer(i) => GraphValue::Scalar(Scalar::Integer(i.value)),
        BoltType::Float(f) => GraphValue::Scalar(Scalar::Float(f.value)),
        BoltType::String(s) => GraphValue::Scalar(Scalar::String(s.value)),
        BoltType::List(list) => {
            GraphValue::List(list.value.into_iter().map(bolt_to_value).collect())
        }
        BoltType::Map(map) => GraphValue::Map(convert_properties(map)),
        BoltType::Node(node) => GraphValue::Node(convert_node(node)),
        BoltType::Relation(rel) => GraphValue::Relationship(Relationship {
            id: rel.id.value,
            rel_type: rel.typ.value,
            start: Some(rel.start_node_id.value),
            end: Some(rel.end_node_id.value),
            properties: convert_properties(rel.properties),
        }),
        BoltType::UnboundedRelation(rel) => GraphValue::Relationship(Relationship {
            id: rel.id.value,
            rel_type: rel.typ.value,
            start: None,
            end: None,
            properties: convert_properties(rel.properties),
        }),
        BoltType::Path(path) => GraphValue::Path(convert_path(path)),
        BoltType::Bytes(bytes) => GraphValue::List(
            bytes
                .value
                .iter()
                .map(|b| GraphValue::Scalar(Scalar::Integer(i64::from(*b))))
                .collect(),
        ),
        // Temporal and spatial kinds
        other => GraphValue::Scalar(Scalar::Other(temporal_text(&other))),
    }
}

// ----------------------------------------------------------------------------
// Temporal and spatial values -> text
// ----------------------------------------------------------------------------

/// Text form of temporal and spatial values.
///
/// Dates and times use ISO-8601 (`2024-01-01`, `10:30:00Z`,
/// `2024-01-01T10:00:00+01:00[Europe/Paris]`). Durations use the ISO
/// `PT<seconds>S` form; the driver folds months and days into seconds before
/// they reach us. Points print as `Point{srid=4326, x=1.5, y=2.0}`. Values the
/// driver cannot convert fall back to their debug form.
fn temporal_text(value: &BoltType) -> String {
    let text = match value {
        BoltType::Date(date) => NaiveDate::try_from(date).ok().map(|d| d.to_string()),
        BoltType::Time(time) => {
            let (time, offset) = <(NaiveTime, FixedOffset)>::from(time);
            Some(format!("{}{}", time, offset_text(offset)))
        }
        BoltType::LocalTime(time) => Some(NaiveTime::from(time).to_string()),
        BoltType::DateTime(datetime) => DateTime::<FixedOffset>::try_from(datetime)
            .ok()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        BoltType::LocalDateTime(datetime) => NaiveDateTime::try_from(datetime)
            .ok()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        BoltType::DateTimeZoneId(datetime) => DateTime::<FixedOffset>::try_from(datetime)
            .ok()
            .map(|dt| {
                format!(
                    "{}[{}]",
                    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    datetime.tz_id()
                )
            }),
        BoltType::Duration(duration) => Some(duration_text(duration.clone())),
        BoltType::Point2D(point) => Some(format!(
            "Point{{srid={}, x={:?}, y={:?}}}",
            point.sr_id.value, point.x.value, point.y.value
        )),
        BoltType::Point3D(point) => Some(format!(
            "Point{{srid={}, x={:?}, y={:?}, z={:?}}}",
            point.sr_id.value, point.x.value, point.y.value, point.z.value
        )),
        _ => None,
    };

    text.unwrap_or_else(|| format!("{:?}", value))
}

fn offset_text(offset: FixedOffset) -> String {
    if offset.local_minus_utc() == 0 {
        "Z".to_string()
    } else {
        offset.to_string()
    }
}

fn duration_text(duration: BoltDuration) -> String {
    let total = std::time::Duration::from(duration);
    // Negative durations arrive two's-complement wrapped in the seconds.
    let nanos = i128::from(total.as_secs() as i64) * 1_000_000_000
        + i128::from(total.subsec_nanos());

    let sign = if nanos < 0 { "-" } else { "" };
    let nanos = nanos.unsigned_abs();
    let (seconds, fraction) = (nanos / 1_000_000_000, nanos % 1_000_000_000);

    if fraction == 0 {
        format!("PT{}{}S", sign, seconds)
    } else {
        let fraction = format!("{:09}", fraction);
        format!("PT{}{}.{}S", sign, seconds, fraction.trim_end_matches('0'))
    }
}

fn convert_properties(map: BoltMap) -> Properties {
    map.value
        .into_iter()
        .map(|(k, v)| (k.value, bolt_to_value(v)))
        .collect()
}

fn convert_node(node: BoltNode) -> Node {
    Node {
        id: node.id.value,
        labels: node
            .labels
            .value
            .into_iter()
            .filter_map(|label| match label {
                BoltType::String(s) => Some(s.value),
                _ => None,
            })
            .collect(),
        properties: convert_properties(node.properties),
    }
}

fn convert_path(path: BoltPath) -> Path {
    let nodes = path
        .nodes
        .value
        .into_iter()
        .filter_map(|n| match n {
            BoltType::Node(node) => Some(convert_node(node)),
            _ => None,
        })
        .collect();
    let relationships = path
        .rels
        .value
        .into_iter()
        .filter_map(|r| match bolt_to_value(r) {
            GraphValue::Relationship(rel) => Some(rel),
            _ => None,
        })
        .collect();
    let indices = path
        .indices
        .value
        .into_iter()
        .filter_map(|i| match i {
            BoltType::Integer(i) => Some(i.value),
            _ => None,
        })
        .collect::<Vec<_>>();

    assemble_path(nodes, relationships, &indices)
}

/// Rebuilds a path in traversal order from Bolt's compact encoding.
///
/// `nodes` and `relationships` hold each distinct element once. `indices`
/// alternates a 1-based relationship index (negative when traversed against
/// its direction) with a 0-based index of the next node. The path starts at
/// `nodes[0]`. Out-of-range steps are skipped.
fn assemble_path(nodes: Vec<Node>, relationships: Vec<Relationship>, indices: &[i64]) -> Path {
    let mut path = Path::default();
    let Some(first) = nodes.first() else {
        return path;
    };
    path.nodes.push(first.clone());

    for step in indices.chunks_exact(2) {
        let (rel_index, node_index) = (step[0], step[1]);

        let rel = usize::try_from(rel_index.unsigned_abs())
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| relationships.get(i));
        let node = usize::try_from(node_index).ok().and_then(|i| nodes.get(i));
        let (Some(rel), Some(node)) = (rel, node) else {
            continue;
        };

        let prev = path.nodes.last().map(|n| n.id).unwrap_or_default();
        let (start, end) = if rel_index > 0 {
            (prev, node.id)
        } else {
            (node.id, prev)
        };

        path.relationships.push(Relationship {
            start: Some(start),
            end: Some(end),
            ..rel.clone()
        });
        path.nodes.push(node.clone());
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: i64) -> Node {
        Node {
            id,
            labels: vec!["Person".to_string()],
            properties: Properties::new(),
        }
    }

    fn rel(id: i64) -> Relationship {
        Relationship {
            id,
            rel_type: "KNOWS".to_string(),
            start: None,
            end: None,
            properties: Properties::new(),
        }
    }

    #[test]
    fn test_json_to_bolt_scalars() {
        assert!(matches!(json_to_bolt(json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(json!(true)), BoltType::Boolean(b) if b.value));
        assert!(matches!(json_to_bolt(json!(42)), BoltType::Integer(i) if i.value == 42));
        assert!(matches!(json_to_bolt(json!(1.5)), BoltType::Float(f) if f.value == 1.5));
        assert!(matches!(json_to_bolt(json!("x")), BoltType::String(s) if s.value == "x"));
    }

    #[test]
    fn test_json_to_bolt_nested() {
        let bolt = json_to_bolt(json!({"ids": [1, 2], "name": "Al"}));
        let BoltType::Map(map) = bolt else {
            panic!("expected map");
        };
        assert_eq!(map.value.len(), 2);
        assert!(matches!(
            map.value.get(&BoltString::from("ids".to_string())),
            Some(BoltType::List(list)) if list.value.len() == 2
        ));
    }

    #[test]
    fn test_bolt_to_value_round_trips_parameters() {
        let value = bolt_to_value(json_to_bolt(json!({"a": [1, "x", null], "b": false})));
        let GraphValue::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(
            map.get("a"),
            Some(&GraphValue::List(vec![
                1i64.into(),
                "x".into(),
                GraphValue::Null
            ]))
        );
        assert_eq!(map.get("b"), Some(&false.into()));
    }

    #[test]
    fn test_order_fields_follows_return_columns() {
        let fields = vec![
            ("b".to_string(), GraphValue::from("x")),
            ("a".to_string(), GraphValue::from(1i64)),
        ];
        let record = order_fields(fields, &["b".to_string(), "a".to_string()]);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_order_fields_unknown_columns_sorted_last() {
        let fields = vec![
            ("z".to_string(), GraphValue::Null),
            ("y".to_string(), GraphValue::Null),
            ("first".to_string(), GraphValue::Null),
        ];
        let record = order_fields(fields, &["first".to_string()]);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["first", "y", "z"]);
    }

    #[test]
    fn test_date_renders_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            bolt_to_value(BoltType::from(date)),
            GraphValue::Scalar(Scalar::Other("2024-01-01".to_string()))
        );
    }

    #[test]
    fn test_local_datetime_renders_iso() {
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            temporal_text(&BoltType::from(datetime)),
            "2024-01-01T10:00:00"
        );

        let precise = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(10, 0, 0, 250)
            .unwrap();
        assert_eq!(
            temporal_text(&BoltType::from(precise)),
            "2024-01-01T10:00:00.250"
        );
    }

    #[test]
    fn test_datetime_with_offset_renders_iso() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();
        assert_eq!(
            temporal_text(&BoltType::from(datetime)),
            "2024-01-01T10:00:00+01:00"
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        let datetime = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_local_timezone(utc)
            .unwrap();
        assert_eq!(
            temporal_text(&BoltType::from(datetime)),
            "2024-01-01T10:00:00Z"
        );
    }

    #[test]
    fn test_datetime_with_zone_id() {
        let local = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            temporal_text(&BoltType::from((local, "Europe/Paris"))),
            "2024-01-01T10:00:00+01:00[Europe/Paris]"
        );
    }

    #[test]
    fn test_times_render_iso() {
        let time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(temporal_text(&BoltType::from(time)), "10:30:00");

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(temporal_text(&BoltType::from((time, utc))), "10:30:00Z");

        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            temporal_text(&BoltType::from((time, minus_five))),
            "10:30:00-05:00"
        );
    }

    #[test]
    fn test_duration_renders_iso() {
        let duration = |days: i64, seconds: i64, nanos: i64| {
            BoltType::Duration(BoltDuration::new(
                BoltInteger::new(0),
                BoltInteger::new(days),
                BoltInteger::new(seconds),
                BoltInteger::new(nanos),
            ))
        };
        assert_eq!(temporal_text(&duration(0, 90, 0)), "PT90S");
        assert_eq!(temporal_text(&duration(1, 30, 500_000_000)), "PT86430.5S");
        assert_eq!(temporal_text(&duration(0, -90, 0)), "PT-90S");
        assert_eq!(temporal_text(&duration(0, -90, 500_000_000)), "PT-89.5S");
    }

    #[test]
    fn test_points_render() {
        let point = BoltType::Point2D(neo4rs::BoltPoint2D {
            sr_id: BoltInteger::new(4326),
            x: BoltFloat::new(1.5),
            y: BoltFloat::new(2.0),
        });
        assert_eq!(temporal_text(&point), "Point{srid=4326, x=1.5, y=2.0}");

        let point = BoltType::Point3D(neo4rs::BoltPoint3D {
            sr_id: BoltInteger::new(9157),
            x: BoltFloat::new(1.0),
            y: BoltFloat::new(2.0),
            z: BoltFloat::new(-3.5),
        });
        assert_eq!(
            temporal_text(&point),
            "Point{srid=9157, x=1.0, y=2.0, z=-3.5}"
        );
    }

    #[test]
    fn test_order_fields_with_parsed_columns() {
        let fields = vec![
            ("n.age".to_string(), GraphValue::from(42i64)),
            ("n.skip".to_string(), GraphValue::from(true)),
        ];
        let columns = return_columns("MATCH (n) RETURN n.skip, n.age");
        let record = order_fields(fields, &columns);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["n.skip", "n.age"]);
    }

    #[test]
    fn test_assemble_path_forward() {
        let path = assemble_path(
            vec![node(1), node(2), node(3)],
            vec![rel(10), rel(11)],
            &[1, 1, 2, 2],
        );
        assert_eq!(path.len(), 2);
        assert_eq!(
            path.nodes.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(path.relationships[0].start, Some(1));
        assert_eq!(path.relationships[0].end, Some(2));
    }

    #[test]
    fn test_assemble_path_reverse_and_revisit() {
        // 1 <-[10]- 2 -[11]-> 1
        let path = assemble_path(vec![node(1), node(2)], vec![rel(10), rel(11)], &[-1, 1, 2, 0]);
        assert_eq!(
            path.nodes.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![1, 2, 1]
        );
        assert_eq!(path.relationships[0].start, Some(2));
        assert_eq!(path.relationships[0].end, Some(1));
        assert_eq!(path.relationships[1].start, Some(2));
        assert_eq!(path.relationships[1].end, Some(1));
    }

    #[test]
    fn test_assemble_path_single_node() {
        let path = assemble_path(vec![node(1)], vec![], &[]);
        assert!(path.is_empty());
        assert_eq!(path.nodes.len(), 1);
    }

    #[test]
    fn test_assemble_path_skips_out_of_range_steps() {
        let path = assemble_path(vec![node(1), node(2)], vec![rel(10)], &[5, 1, 1, 9, 1, 1]);
        assert_eq!(path.len(), 1);
        assert_eq!(path.nodes.len(), 2);
    }
}
