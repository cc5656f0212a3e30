//! Error type shared by the graph model, configuration and record parsing.

use std::io;

use crate::acs::NodeId;

/// Errors raised while building a [`World`](crate::acs::World), validating
/// an [`AcsConfig`](crate::acs::AcsConfig) or reading node/edge records.
///
/// A stalled ant is never reported through this type; callers poll
/// [`Ant::can_move`](crate::acs::Ant::can_move) instead.
#[derive(Debug, thiserror::Error)]
pub enum AcoError {
    #[error("{name} must be in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },

    #[error("{name} must be a finite non-negative number, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("Q must be a finite positive number, got {0}")]
    NonPositiveIntensity(f64),

    #[error("ant count must be at least 1")]
    NoAnts,

    #[error("initial pheromone must be a finite positive number, got {0}")]
    InvalidTau0(f64),

    #[error("malformed initial pheromone {0:?}: expected a number or \"greedy\"")]
    MalformedTau0(String),

    #[error("start node {0} is not in the graph")]
    UnknownStartNode(NodeId),

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("graph has no edges")]
    NoEdges,

    #[error("solving needs at least two nodes, got {0}")]
    TooFewNodes(usize),

    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("edge {first} -> {second} references unknown node {missing}")]
    UnknownEndpoint {
        first: NodeId,
        second: NodeId,
        missing: NodeId,
    },

    #[error("edge on node {0} connects the node to itself")]
    SelfLoop(NodeId),

    #[error("edge {first} -> {second} has invalid weight {weight}")]
    InvalidWeight {
        first: NodeId,
        second: NodeId,
        weight: f64,
    },

    #[error("graph is not complete")]
    IncompleteGraph,

    #[error("solver has no colony; call prepare_for_one_step_solving first")]
    NotPrepared,

    #[error("bad {kind} record on line {line}: {message}")]
    Parse {
        kind: &'static str,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
