//! Nearest-neighbour baseline used to seed the initial pheromone.

use super::types::{EdgeIndex, NodeId};
use super::world::World;
use crate::error::AcoError;

/// Open path produced by the nearest-neighbour heuristic.
#[derive(Debug, Clone)]
pub struct GreedyTour {
    /// Sum of the path's edge weights. The closing edge back to the first
    /// node is not included.
    pub cost: f64,
    pub edges: Vec<EdgeIndex>,
    pub nodes: Vec<NodeId>,
}

/// Walks from the first inserted node, always taking the lightest edge to an
/// unvisited node. Ties keep the earliest edge in creation order.
///
/// Fails with [`AcoError::IncompleteGraph`] when the walk strands before
/// every node is visited.
pub fn greedy_tour(world: &World) -> Result<GreedyTour, AcoError> {
    let start = world.nodes().first().ok_or(AcoError::EmptyGraph)?.id;
    let mut visited = vec![false; world.node_count()];
    let mut nodes = Vec::with_capacity(world.node_count());
    let mut edges = Vec::with_capacity(world.node_count().saturating_sub(1));
    let mut cost = 0.0;

    let mut current = start;
    visited[0] = true;
    nodes.push(start);

    while nodes.len() < world.node_count() {
        let mut next: Option<(EdgeIndex, NodeId, f64)> = None;
        for (idx, edge) in world.adjacent_edges(current) {
            let neighbor = edge.other(current);
            let Some(pos) = world.position(neighbor) else {
                continue;
            };
            if visited[pos] {
                continue;
            }
            if next.is_none_or(|(_, _, best)| edge.weight() < best) {
                next = Some((idx, neighbor, edge.weight()));
            }
        }

        let (idx, neighbor, weight) = next.ok_or(AcoError::IncompleteGraph)?;
        if let Some(pos) = world.position(neighbor) {
            visited[pos] = true;
        }
        nodes.push(neighbor);
        edges.push(idx);
        cost += weight;
        current = neighbor;
    }

    Ok(GreedyTour { cost, edges, nodes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acs::Node;
    use crate::format::EdgeRecord;

    #[test]
    fn test_greedy_line() {
        let nodes = vec![
            Node::new(10, 0.0, 0.0),
            Node::new(11, 5.0, 0.0),
            Node::new(12, 1.0, 0.0),
            Node::new(13, 2.0, 0.0),
        ];
        let world = World::complete(nodes).unwrap();
        let tour = greedy_tour(&world).unwrap();
        assert_eq!(tour.nodes, vec![10, 12, 13, 11]);
        assert_eq!(tour.edges.len(), 3);
        assert!((tour.cost - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_tie_keeps_first_edge() {
        let world = World::complete(vec![
            Node::new(0, 0.0, 0.0),
            Node::new(1, 1.0, 0.0),
            Node::new(2, -1.0, 0.0),
        ])
        .unwrap();
        let tour = greedy_tour(&world).unwrap();
        assert_eq!(tour.nodes, vec![0, 1, 2]);
    }

    #[test]
    fn test_greedy_single_node() {
        let world = World::complete(vec![Node::new(0, 0.0, 0.0)]).unwrap();
        let tour = greedy_tour(&world).unwrap();
        assert_eq!(tour.nodes, vec![0]);
        assert_eq!(tour.cost, 0.0);
    }

    #[test]
    fn test_greedy_strands_on_incomplete_graph() {
        let nodes = vec![
            Node::new(0, 0.0, 0.0),
            Node::new(1, 1.0, 0.0),
            Node::new(2, 2.0, 0.0),
        ];
        let edges = vec![EdgeRecord {
            first: 0,
            second: 1,
            weight: 1.0,
        }];
        let world = World::with_edges(nodes, edges).unwrap();
        assert!(matches!(
            greedy_tour(&world),
            Err(AcoError::IncompleteGraph)
        ));
    }
}
