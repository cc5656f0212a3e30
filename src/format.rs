//! Node and edge record formats.
//!
//! Nodes are `id;name;x;y`, edges are `first;second;weight`, one record per
//! line. Lines starting with `#` are comments and blank lines are ignored.
//!
//! ```
//! use u_antcolony::format::parse_nodes;
//!
//! let nodes = parse_nodes("# id;name;x;y\n1;Prague;0;0\n2;Brno;3;4\n").unwrap();
//! assert_eq!(nodes.len(), 2);
//! assert_eq!(nodes[1].name.as_deref(), Some("Brno"));
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::acs::{Node, NodeId};
use crate::error::AcoError;

/// A parsed edge line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub first: NodeId,
    pub second: NodeId,
    pub weight: f64,
}

/// Parses node records. At least one node is required.
pub fn parse_nodes(input: &str) -> Result<Vec<Node>, AcoError> {
    let mut nodes = Vec::new();
    for (line, fields) in records(input) {
        let [id, name, x, y] = split_fields::<4>("node", line, fields)?;
        let name = (!name.is_empty()).then(|| name.to_string());
        nodes.push(Node {
            id: field("node", line, "id", id)?,
            x: field("node", line, "x", x)?,
            y: field("node", line, "y", y)?,
            name,
        });
    }
    if nodes.is_empty() {
        return Err(AcoError::EmptyGraph);
    }
    Ok(nodes)
}

/// Parses edge records. At least one edge is required.
pub fn parse_edges(input: &str) -> Result<Vec<EdgeRecord>, AcoError> {
    let mut edges = Vec::new();
    for (line, fields) in records(input) {
        let [first, second, weight] = split_fields::<3>("edge", line, fields)?;
        edges.push(EdgeRecord {
            first: field("edge", line, "first node id", first)?,
            second: field("edge", line, "second node id", second)?,
            weight: field("edge", line, "weight", weight)?,
        });
    }
    if edges.is_empty() {
        return Err(AcoError::NoEdges);
    }
    Ok(edges)
}

pub fn read_nodes(path: impl AsRef<Path>) -> Result<Vec<Node>, AcoError> {
    parse_nodes(&fs::read_to_string(path)?)
}

pub fn read_edges(path: impl AsRef<Path>) -> Result<Vec<EdgeRecord>, AcoError> {
    parse_edges(&fs::read_to_string(path)?)
}

/// Non-comment, non-blank lines with their 1-based line numbers.
fn records(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.starts_with('#') && !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
}

fn split_fields<'a, const N: usize>(
    kind: &'static str,
    line: usize,
    record: &'a str,
) -> Result<[&'a str; N], AcoError> {
    let fields: Vec<&str> = record.split(';').map(str::trim).collect();
    fields.try_into().map_err(|fields: Vec<&str>| AcoError::Parse {
        kind,
        line,
        message: format!("expected {N} fields, found {}", fields.len()),
    })
}

fn field<T: FromStr>(
    kind: &'static str,
    line: usize,
    name: &str,
    value: &str,
) -> Result<T, AcoError> {
    value.parse().map_err(|_| AcoError::Parse {
        kind,
        line,
        message: format!("invalid {name} {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acs::World;

    #[test]
    fn test_parse_nodes() {
        let input = "# cities\n0;A;0.0;0.0\n1;B;1.5;-2\n\n2;;3;4\n";
        let nodes = parse_nodes(input).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].name.as_deref(), Some("A"));
        assert!((nodes[1].y + 2.0).abs() < 1e-12);
        assert!(nodes[2].name.is_none());
    }

    #[test]
    fn test_parse_nodes_crlf() {
        let nodes = parse_nodes("0;A;1;2\r\n1;B;3;4\r\n").unwrap();
        assert!((nodes[1].y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_nodes_errors() {
        assert!(matches!(parse_nodes("# only comments\n"), Err(AcoError::EmptyGraph)));
        assert!(matches!(
            parse_nodes("0;A;1;2\n1;B;3\n"),
            Err(AcoError::Parse { kind: "node", line: 2, .. })
        ));
        assert!(matches!(
            parse_nodes("x;A;1;2\n"),
            Err(AcoError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_edges() {
        let edges = parse_edges("#a;b;w\n0;1;2.5\n1;2;1\n").unwrap();
        assert_eq!(
            edges[0],
            EdgeRecord {
                first: 0,
                second: 1,
                weight: 2.5
            }
        );
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_parse_edges_errors() {
        assert!(matches!(parse_edges(""), Err(AcoError::NoEdges)));
        assert!(matches!(
            parse_edges("0;1;far\n"),
            Err(AcoError::Parse { kind: "edge", line: 1, .. })
        ));
    }

    #[test]
    fn test_records_into_world() {
        let nodes = parse_nodes("0;A;0;0\n1;B;3;0\n2;C;3;4\n").unwrap();
        let edges = parse_edges("0;1;3\n1;2;4\n0;2;5\n").unwrap();
        let explicit = World::from_records(nodes.clone(), Some(edges)).unwrap();
        let synthesized = World::from_records(nodes, None).unwrap();
        assert!(explicit.check_for_graph_completion());
        assert!(synthesized.check_for_graph_completion());
        assert_eq!(explicit.edge_count(), synthesized.edge_count());
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_nodes("/nonexistent/nodes.csv"),
            Err(AcoError::Io(_))
        ));
    }
}
