//! Ant Colony System (ACS).
//!
//! A population of ants builds tours over a complete weighted graph. Each
//! ant chooses its next edge either greedily (with probability `q0`) or by
//! roulette wheel over `pheromone^alpha * (1 / weight)^beta`. Walking an edge
//! triggers a local pheromone update; finishing an iteration triggers a
//! global update that evaporates every edge and reinforces the best tour of
//! that iteration.
//!
//! # References
//!
//! - Dorigo & Gambardella (1997), "Ant Colony System: A Cooperative Learning
//!   Approach to the Traveling Salesman Problem"
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a Colony
//!   of Cooperating Agents"

mod ant;
mod config;
mod greedy;
mod runner;
mod types;
mod world;

pub use ant::{Ant, AntState};
pub use config::{AcsConfig, InitialPheromone};
pub use greedy::{greedy_tour, GreedyTour};
pub use runner::{AcsResult, AcsSolver, BestTour, IterationReport};
pub use types::{Edge, EdgeIndex, EdgeKey, Node, NodeId};
pub use world::{euclidean_distance, World};
