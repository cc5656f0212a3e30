//! Colony execution loop.
//!
//! # Algorithm
//!
//! Per iteration:
//!
//! 1. Reset every ant onto its start node (fixed or random)
//! 2. Sweep the colony round-robin: each unfinished ant makes one move
//!    (or its closing move) and the walked edge gets a local update
//! 3. Apply the global update with the iteration's best ant
//! 4. Record that ant's tour if it beats the best so far
//!
//! [`AcsSolver::solve`] runs a fixed number of iterations in one call;
//! [`AcsSolver::prepare_for_one_step_solving`] and
//! [`AcsSolver::solve_one_step`] let an external driver run them one at a
//! time. Both call the same iteration routine, so for equal parameters and
//! seed they produce the same tours.
//!
//! # Reference
//!
//! Dorigo, M. & Gambardella, L. M. (1997). "Ant Colony System: A Cooperative
//! Learning Approach to the Traveling Salesman Problem", *IEEE Transactions
//! on Evolutionary Computation* 1(1), 53-66.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::RngCore;
use u_numflow::random::create_rng;

use super::ant::Ant;
use super::config::AcsConfig;
use super::types::{Edge, EdgeIndex, EdgeKey, NodeId};
use super::world::World;
use crate::error::AcoError;

/// Best tour found so far.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BestTour {
    /// Closed node sequence: starts and ends on the start node.
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeIndex>,
    /// `+inf` until the first iteration completes.
    pub cost: f64,
}

impl Default for BestTour {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            cost: f64::INFINITY,
        }
    }
}

impl BestTour {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Resolves the edge indices against `world`.
    pub fn edges_in<'w>(&'w self, world: &'w World) -> impl Iterator<Item = &'w Edge> + 'w {
        self.edges.iter().map(move |&idx| world.edge(idx))
    }
}

/// Outcome of a single iteration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationReport {
    /// 1-based iteration number.
    pub iteration: usize,
    pub best_ant_id: usize,
    pub best_ant_cost: f64,
    pub best_ant_tour: Vec<EdgeIndex>,
    /// Pheromone range after the global update.
    pub min_pheromone: f64,
    pub max_pheromone: f64,
    /// Whether this iteration replaced the best tour.
    pub improved: bool,
}

/// Result of [`AcsSolver::solve`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcsResult {
    pub best: BestTour,

    /// Iterations executed by this call.
    pub iterations: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best cost after each iteration of this call.
    pub cost_history: Vec<f64>,
}

/// Ant Colony System solver.
///
/// Owns the [`World`] and is the only writer of its pheromone. Ants borrow
/// the world read-only while they pick a move.
pub struct AcsSolver {
    world: World,
    config: AcsConfig,
    /// Effective tau0: initial level and local-update floor.
    tau0: f64,
    rng: Box<dyn RngCore + Send>,
    colony: Vec<Ant>,
    iteration: usize,
    best: BestTour,
}

impl std::fmt::Debug for AcsSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcsSolver")
            .field("config", &self.config)
            .field("tau0", &self.tau0)
            .field("ants", &self.colony.len())
            .field("iteration", &self.iteration)
            .field("best_cost", &self.best.cost)
            .finish_non_exhaustive()
    }
}

impl AcsSolver {
    /// Creates a solver seeded from `config.seed` (random when unset).
    ///
    /// Fails when the configuration is out of range, the start node is not
    /// in the graph, the graph has fewer than two nodes or is not complete,
    /// or the initial pheromone cannot be derived.
    pub fn new(world: World, config: AcsConfig) -> Result<Self, AcoError> {
        let rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::with_rng(world, config, rng)
    }

    /// Creates a solver drawing from the given random stream.
    pub fn with_rng<R>(mut world: World, config: AcsConfig, rng: R) -> Result<Self, AcoError>
    where
        R: RngCore + Send + 'static,
    {
        config.validate()?;
        if let Some(id) = config.start_node {
            if !world.contains_node(id) {
                return Err(AcoError::UnknownStartNode(id));
            }
        }
        if world.node_count() < 2 {
            return Err(AcoError::TooFewNodes(world.node_count()));
        }
        if !world.check_for_graph_completion() {
            return Err(AcoError::IncompleteGraph);
        }

        let tau0 = world.init_pheromone(&config.tau0)?;

        Ok(Self {
            world,
            config,
            tau0,
            rng: Box::new(rng),
            colony: Vec::new(),
            iteration: 0,
            best: BestTour::default(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    pub fn config(&self) -> &AcsConfig {
        &self.config
    }

    /// Effective tau0 returned by [`World::init_pheromone`].
    pub fn tau0(&self) -> f64 {
        self.tau0
    }

    pub fn colony(&self) -> &[Ant] {
        &self.colony
    }

    /// Iterations completed so far, across all calls.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The best tour found so far.
    pub fn best_tour(&self) -> &BestTour {
        &self.best
    }

    /// Runs `iterations` iterations with a freshly created colony.
    pub fn solve(&mut self, iterations: usize) -> AcsResult {
        self.solve_with_cancel(iterations, None)
    }

    /// Runs up to `iterations` iterations, checking `cancel` before each.
    pub fn solve_with_cancel(
        &mut self,
        iterations: usize,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AcsResult {
        self.create_ants();

        let mut cost_history = Vec::with_capacity(iterations);
        let mut cancelled = false;
        let mut executed = 0;

        for _ in 0..iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            self.run_iteration();
            cost_history.push(self.best.cost);
            executed += 1;
        }

        AcsResult {
            best: self.best.clone(),
            iterations: executed,
            cancelled,
            cost_history,
        }
    }

    /// Creates the colony for stepwise solving with
    /// [`solve_one_step`](Self::solve_one_step).
    pub fn prepare_for_one_step_solving(&mut self) {
        self.create_ants();
    }

    /// Runs exactly one iteration.
    ///
    /// The world and best tour are consistent when this returns, so a driver
    /// can stop between calls at any point.
    pub fn solve_one_step(&mut self) -> Result<IterationReport, AcoError> {
        if self.colony.is_empty() {
            return Err(AcoError::NotPrepared);
        }
        Ok(self.run_iteration())
    }

    fn start_node(&mut self) -> NodeId {
        match self.config.start_node {
            Some(id) => id,
            None => {
                self.world
                    .random_node(&mut *self.rng)
                    .expect("solver world has at least two nodes")
                    .id
            }
        }
    }

    fn create_ants(&mut self) {
        let mut colony = Vec::with_capacity(self.config.ant_count);
        for id in 0..self.config.ant_count {
            let start = self.start_node();
            colony.push(Ant::new(id, start, &self.world));
        }
        self.colony = colony;
    }

    fn reset_ants(&mut self) {
        for i in 0..self.colony.len() {
            let start = self.start_node();
            self.colony[i].reset(start);
        }
    }

    fn run_iteration(&mut self) -> IterationReport {
        self.reset_ants();
        let ranking = self.do_ants_solutions();
        let best_ant = &self.colony[ranking[0]];
        let best_ant_id = best_ant.id();
        let best_ant_cost = best_ant.tour_cost();
        let best_ant_tour = best_ant.tour().to_vec();

        let (min_pheromone, max_pheromone) = self.global_update(ranking[0]);
        self.iteration += 1;

        let improved = best_ant_cost < self.best.cost;
        if improved {
            let ant = &self.colony[ranking[0]];
            let mut nodes = ant.visited_nodes().to_vec();
            nodes.push(ant.current_node());
            self.best = BestTour {
                nodes,
                edges: best_ant_tour.clone(),
                cost: best_ant_cost,
            };
            tracing::info!(
                iteration = self.iteration,
                cost = best_ant_cost,
                ant = best_ant_id,
                "new best tour"
            );
        }
        tracing::debug!(
            iteration = self.iteration,
            best_ant_cost,
            best_cost = self.best.cost,
            min_pheromone,
            max_pheromone,
            "iteration complete"
        );

        IterationReport {
            iteration: self.iteration,
            best_ant_id,
            best_ant_cost,
            best_ant_tour,
            min_pheromone,
            max_pheromone,
            improved,
        }
    }

    /// Builds every ant's tour with round-robin sweeps and returns colony
    /// indices ordered by ascending tour cost.
    fn do_ants_solutions(&mut self) -> Vec<usize> {
        let mut finished = vec![false; self.colony.len()];
        let mut remaining = self.colony.len();

        while remaining > 0 {
            for i in 0..self.colony.len() {
                if finished[i] {
                    continue;
                }
                let ant = &mut self.colony[i];
                let moved = if ant.can_move(&self.world) {
                    ant.do_next_move_acs(
                        &self.world,
                        self.config.q0,
                        self.config.alpha,
                        self.config.beta,
                        &mut *self.rng,
                    )
                } else if !ant.has_returned_to_start() {
                    ant.do_final_move_to_start(&self.world)
                } else {
                    None
                };

                match moved {
                    Some(edge) => {
                        self.local_update(edge);
                        let ant = &self.colony[i];
                        if ant.has_returned_to_start() && !ant.can_move(&self.world) {
                            finished[i] = true;
                            remaining -= 1;
                        }
                    }
                    None => {
                        let ant = &self.colony[i];
                        if !ant.has_returned_to_start() {
                            tracing::warn!(
                                ant = ant.id(),
                                node = ant.current_node(),
                                "ant stalled before closing its tour"
                            );
                        }
                        finished[i] = true;
                        remaining -= 1;
                    }
                }
            }
        }

        let mut ranking: Vec<usize> = (0..self.colony.len()).collect();
        ranking.sort_by(|&a, &b| {
            self.colony[a]
                .tour_cost()
                .total_cmp(&self.colony[b].tour_cost())
        });
        ranking
    }

    /// `p = max((1 - rho) * p + rho * tau0, tau0)` on the edge just walked.
    fn local_update(&mut self, idx: EdgeIndex) {
        let rho = self.config.rho;
        let tau0 = self.tau0;
        let edge = self.world.edge_mut(idx);
        edge.pheromone = ((1.0 - rho) * edge.pheromone + rho * tau0).max(tau0);
    }

    /// Evaporates every edge and reinforces the tour of `colony[best]` by
    /// `Q / cost`. Returns the resulting `(min, max)` pheromone.
    fn global_update(&mut self, best: usize) -> (f64, f64) {
        let ant = &self.colony[best];
        let deposit = self.config.q / ant.tour_cost();
        let on_tour: HashSet<(EdgeKey, u64)> = ant
            .tour_edges(&self.world)
            .map(|e| (e.key(), e.weight().to_bits()))
            .collect();

        let decay = self.config.alpha_decay;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for edge in self.world.edges_mut() {
            let contribution = if on_tour.contains(&(edge.key(), edge.weight().to_bits())) {
                deposit
            } else {
                0.0
            };
            edge.pheromone = (1.0 - decay) * edge.pheromone + contribution;
            lo = lo.min(edge.pheromone);
            hi = hi.max(edge.pheromone);
        }
        (lo, hi)
    }
}
