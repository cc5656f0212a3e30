//! Graph model: nodes, edges and the pheromone they carry.
//!
//! The [`World`] owns every pheromone value. Ants read it while choosing a
//! move; only the solver writes it.

use std::collections::HashMap;

use rand::Rng;

use super::config::InitialPheromone;
use super::greedy::greedy_tour;
use super::types::{Edge, EdgeIndex, Node, NodeId};
use crate::error::AcoError;
use crate::format::EdgeRecord;

/// Euclidean distance between two nodes, rounded to three decimals.
///
/// This is the distance used when the complete graph is synthesized and no
/// other function is supplied.
pub fn euclidean_distance(a: &Node, b: &Node) -> f64 {
    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
    (d * 1000.0).round() / 1000.0
}

/// Weighted undirected graph with per-edge pheromone.
///
/// Nodes keep their insertion order and edges their creation order; both
/// orders are observable through adjacency queries and tie-breaking.
#[derive(Debug, Clone)]
pub struct World {
    nodes: Vec<Node>,
    positions: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    /// Edge indices touching each node, by node position.
    adjacency: Vec<Vec<EdgeIndex>>,
}

impl World {
    /// Builds the complete graph over `nodes` with [`euclidean_distance`]
    /// weights.
    pub fn complete(nodes: Vec<Node>) -> Result<Self, AcoError> {
        Self::complete_with(nodes, euclidean_distance)
    }

    /// Builds the complete graph over `nodes`, weighting each pair with
    /// `distance`.
    pub fn complete_with<F>(nodes: Vec<Node>, distance: F) -> Result<Self, AcoError>
    where
        F: Fn(&Node, &Node) -> f64,
    {
        let mut world = Self::with_nodes(nodes)?;
        world.rebuild_complete_edges(distance)?;
        Ok(world)
    }

    /// Builds a graph from explicit edge records.
    ///
    /// Completeness is not enforced here; see
    /// [`check_for_graph_completion`](Self::check_for_graph_completion).
    pub fn with_edges<I>(nodes: Vec<Node>, edges: I) -> Result<Self, AcoError>
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        let mut world = Self::with_nodes(nodes)?;
        for record in edges {
            world.push_edge(record.first, record.second, record.weight)?;
        }
        if world.edges.is_empty() {
            return Err(AcoError::NoEdges);
        }
        Ok(world)
    }

    /// Builds a graph from parsed records: explicit edges when given,
    /// otherwise the Euclidean complete graph.
    pub fn from_records(
        nodes: Vec<Node>,
        edges: Option<Vec<EdgeRecord>>,
    ) -> Result<Self, AcoError> {
        match edges {
            Some(edges) => Self::with_edges(nodes, edges),
            None => Self::complete(nodes),
        }
    }

    fn with_nodes(nodes: Vec<Node>) -> Result<Self, AcoError> {
        if nodes.is_empty() {
            return Err(AcoError::EmptyGraph);
        }
        let mut positions = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            if positions.insert(node.id, pos).is_some() {
                return Err(AcoError::DuplicateNode(node.id));
            }
        }
        let adjacency = vec![Vec::new(); nodes.len()];
        Ok(Self {
            nodes,
            positions,
            edges: Vec::new(),
            adjacency,
        })
    }

    fn push_edge(&mut self, first: NodeId, second: NodeId, weight: f64) -> Result<(), AcoError> {
        let (a, b) = self.check_edge(first, second, weight)?;
        self.attach_edge(a, b, Edge::new(first, second, weight));
        Ok(())
    }

    /// Resolves and validates an edge, returning the endpoint positions.
    fn check_edge(
        &self,
        first: NodeId,
        second: NodeId,
        weight: f64,
    ) -> Result<(usize, usize), AcoError> {
        let missing = |id| AcoError::UnknownEndpoint {
            first,
            second,
            missing: id,
        };
        let a = self.position(first).ok_or_else(|| missing(first))?;
        let b = self.position(second).ok_or_else(|| missing(second))?;
        if a == b {
            return Err(AcoError::SelfLoop(first));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(AcoError::InvalidWeight {
                first,
                second,
                weight,
            });
        }
        Ok((a, b))
    }

    fn attach_edge(&mut self, a: usize, b: usize, edge: Edge) {
        let idx = self.edges.len();
        self.edges.push(edge);
        self.adjacency[a].push(idx);
        self.adjacency[b].push(idx);
    }

    /// Replaces every edge with the complete graph weighted by `distance`.
    ///
    /// Pairs are generated in node insertion order (`i < j`). All pheromone
    /// is reset to zero. On error the existing edges are left untouched.
    pub fn rebuild_complete_edges<F>(&mut self, distance: F) -> Result<(), AcoError>
    where
        F: Fn(&Node, &Node) -> f64,
    {
        let n = self.nodes.len();
        let mut pending = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.nodes[i], &self.nodes[j]);
                let weight = distance(a, b);
                self.check_edge(a.id, b.id, weight)?;
                pending.push((i, j, Edge::new(a.id, b.id, weight)));
            }
        }

        self.edges.clear();
        self.adjacency.iter_mut().for_each(Vec::clear);
        self.edges.reserve(pending.len());
        for (a, b, edge) in pending {
            self.attach_edge(a, b, edge);
        }
        Ok(())
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.position(id).map(|pos| &self.nodes[pos])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Insertion position of a node, used for dense per-node bookkeeping.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, idx: EdgeIndex) -> &Edge {
        &self.edges[idx]
    }

    pub(crate) fn edge_mut(&mut self, idx: EdgeIndex) -> &mut Edge {
        &mut self.edges[idx]
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Indices of all edges with `node` as either endpoint, in edge creation
    /// order. Empty for an unknown node.
    pub fn adjacent_edge_indices(&self, node: NodeId) -> &[EdgeIndex] {
        match self.position(node) {
            Some(pos) => &self.adjacency[pos],
            None => &[],
        }
    }

    /// All edges with `node` as either endpoint, in edge creation order.
    pub fn adjacent_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeIndex, &Edge)> + '_ {
        self.adjacent_edge_indices(node)
            .iter()
            .map(move |&idx| (idx, &self.edges[idx]))
    }

    /// Index of the first edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeIndex> {
        self.adjacent_edges(a)
            .find(|(_, edge)| edge.other(a) == b)
            .map(|(idx, _)| idx)
    }

    /// Picks a node uniformly at random.
    pub fn random_node<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Node, AcoError> {
        if self.nodes.is_empty() {
            return Err(AcoError::EmptyGraph);
        }
        Ok(&self.nodes[rng.random_range(0..self.nodes.len())])
    }

    /// Whether every unordered pair of distinct nodes is joined by at least
    /// one edge.
    pub fn check_for_graph_completion(&self) -> bool {
        let n = self.nodes.len();
        let mut connected = vec![false; n * n];
        for edge in &self.edges {
            // Endpoints are validated on insertion.
            let (Some(a), Some(b)) = (self.position(edge.first()), self.position(edge.second()))
            else {
                continue;
            };
            connected[a * n + b] = true;
            connected[b * n + a] = true;
        }
        let pairs = connected.iter().filter(|&&c| c).count();
        let complete = pairs + n == n * n;

        if complete {
            tracing::debug!(nodes = n, edges = self.edges.len(), "graph is complete");
        } else {
            tracing::debug!(
                nodes = n,
                edges = self.edges.len(),
                missing_pairs = (n * n - n - pairs) / 2,
                "graph is not complete"
            );
        }
        complete
    }

    /// Sets the pheromone of every edge and returns the effective `tau0`.
    ///
    /// - `Constant(t)`: every edge gets `t`; returns `t`.
    /// - `Greedy`: with `C` the nearest-neighbour tour cost, every edge gets
    ///   `1 / (|nodes| * C)`; returns `1 / C`.
    pub fn init_pheromone(&mut self, tau0: &InitialPheromone) -> Result<f64, AcoError> {
        let (per_edge, effective) = match *tau0 {
            InitialPheromone::Constant(value) => {
                if !value.is_finite() || value <= 0.0 {
                    return Err(AcoError::InvalidTau0(value));
                }
                (value, value)
            }
            InitialPheromone::Greedy => {
                if self.nodes.len() < 2 {
                    return Err(AcoError::TooFewNodes(self.nodes.len()));
                }
                let cost = greedy_tour(self)?.cost;
                (1.0 / (self.nodes.len() as f64 * cost), 1.0 / cost)
            }
        };

        for edge in &mut self.edges {
            edge.pheromone = per_edge;
        }
        tracing::debug!(per_edge, tau0 = effective, "pheromone initialized");
        Ok(effective)
    }

    /// `(min, max)` pheromone over all edges; `(inf, -inf)` without edges.
    pub fn pheromone_range(&self) -> (f64, f64) {
        self.edges
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
                (lo.min(e.pheromone), hi.max(e.pheromone))
            })
    }
}
