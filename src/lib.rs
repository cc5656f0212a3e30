//! Ant Colony System (ACS) for the Traveling Salesman Problem.
//!
//! A colony of ants repeatedly builds Hamiltonian cycles over a weighted,
//! complete graph. Every committed move applies a **local** pheromone update
//! to the edge just walked; after all ants close their tours the colony
//! applies a **global** update that evaporates every edge and reinforces the
//! iteration's best tour.
//!
//! - [`acs::World`]: nodes, edges and the pheromone they carry.
//! - [`acs::Ant`]: the tour-construction state machine.
//! - [`acs::AcsSolver`]: the colony loop, runnable in one call
//!   ([`acs::AcsSolver::solve`]) or one iteration at a time
//!   ([`acs::AcsSolver::solve_one_step`]).
//! - [`format`]: the `id;name;x;y` node and `first;second;weight` edge
//!   record formats.
//!
//! # Example
//!
//! ```
//! use u_antcolony::acs::{AcsConfig, AcsSolver, InitialPheromone, Node, World};
//!
//! let nodes = vec![
//!     Node::new(0, 0.0, 0.0),
//!     Node::new(1, 1.0, 0.0),
//!     Node::new(2, 1.0, 1.0),
//!     Node::new(3, 0.0, 1.0),
//! ];
//! let world = World::complete(nodes).unwrap();
//! let config = AcsConfig::default()
//!     .with_ant_count(5)
//!     .with_tau0(InitialPheromone::Constant(0.1))
//!     .with_start_node(0)
//!     .with_seed(7);
//!
//! let mut solver = AcsSolver::new(world, config).unwrap();
//! let result = solver.solve(20);
//! assert!((result.best.cost - 4.0).abs() < 1e-9);
//! ```

pub mod acs;
pub mod error;
pub mod format;

pub use error::AcoError;
