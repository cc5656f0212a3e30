//! Graph primitives: nodes, edges and the key that identifies an edge.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of a [`Node`], unique within a [`World`](super::World).
pub type NodeId = i64;

/// Position of an [`Edge`] in its [`World`](super::World), in creation order.
pub type EdgeIndex = usize;

/// A city of the tour.
///
/// Equality and hashing consider the id only; coordinates and the label are
/// payload.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    /// Optional display label.
    pub name: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.id,
            self.name.as_deref().unwrap_or("-"),
            self.x,
            self.y
        )
    }
}

/// Unordered endpoint pair, stored as `(min, max)`.
///
/// `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeKey {
    pub low: NodeId,
    pub high: NodeId,
}

impl EdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// Undirected weighted edge carrying a pheromone level.
///
/// The weight is fixed at creation. The pheromone is mutated only through
/// the owning [`World`](super::World).
///
/// Two edges are equal when they join the same endpoints (in either
/// direction) with the same weight.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    first: NodeId,
    second: NodeId,
    weight: f64,
    pub(crate) pheromone: f64,
}

impl Edge {
    pub(crate) fn new(first: NodeId, second: NodeId, weight: f64) -> Self {
        Self {
            first,
            second,
            weight,
            pheromone: 0.0,
        }
    }

    pub fn first(&self) -> NodeId {
        self.first
    }

    pub fn second(&self) -> NodeId {
        self.second
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn pheromone(&self) -> f64 {
        self.pheromone
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.first, self.second)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.first == node || self.second == node
    }

    /// The endpoint opposite to `node`.
    ///
    /// `node` is assumed to be one of the endpoints; for any other id the
    /// first endpoint is returned.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.first == node {
            self.second
        } else {
            self.first
        }
    }

    /// `pheromone^alpha * (1 / weight)^beta`, the attractiveness of this edge.
    pub fn desirability(&self, alpha: f64, beta: f64) -> f64 {
        self.pheromone.powf(alpha) * (1.0 / self.weight).powf(beta)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.weight == other.weight
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {} | {} {}",
            self.first, self.second, self.weight, self.pheromone
        )
    }
}
