//! Tour construction agent.
//!
//! An [`Ant`] never holds a reference to the [`World`]: every query borrows
//! it for the duration of the call, so the solver stays free to apply
//! pheromone updates between moves.

use rand::Rng;

use super::types::{Edge, EdgeIndex, NodeId};
use super::world::World;

/// Phase of an ant's tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntState {
    /// No move made since the last reset.
    Ready,
    /// At least one unvisited node is reachable.
    Moving,
    /// Every node visited; only the closing edge to the start remains.
    Returning,
    /// Back at the start node.
    Done,
}

/// A single tour-building agent.
///
/// The id is stable for a solver run; the path state is cleared by
/// [`reset`](Self::reset) between iterations.
#[derive(Debug, Clone)]
pub struct Ant {
    id: usize,
    current: NodeId,
    /// Previously occupied nodes, in order.
    visited: Vec<NodeId>,
    /// `visited` membership by node position in the world.
    visited_mask: Vec<bool>,
    tour: Vec<EdgeIndex>,
    tour_cost: f64,
}

impl Ant {
    /// Creates an ant standing on `start`.
    pub fn new(id: usize, start: NodeId, world: &World) -> Self {
        Self {
            id,
            current: start,
            visited: Vec::with_capacity(world.node_count()),
            visited_mask: vec![false; world.node_count()],
            tour: Vec::with_capacity(world.node_count()),
            tour_cost: 0.0,
        }
    }

    /// Clears the path and places the ant on `start`.
    pub fn reset(&mut self, start: NodeId) {
        self.current = start;
        self.visited.clear();
        self.visited_mask.iter_mut().for_each(|v| *v = false);
        self.tour.clear();
        self.tour_cost = 0.0;
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn current_node(&self) -> NodeId {
        self.current
    }

    /// Nodes left behind, in order. The first entry is the start node.
    pub fn visited_nodes(&self) -> &[NodeId] {
        &self.visited
    }

    /// Traversed edges, in order.
    pub fn tour(&self) -> &[EdgeIndex] {
        &self.tour
    }

    pub fn tour_edges<'w>(&'w self, world: &'w World) -> impl Iterator<Item = &'w Edge> + 'w {
        self.tour.iter().map(move |&idx| world.edge(idx))
    }

    /// Sum of the weights of the traversed edges.
    pub fn tour_cost(&self) -> f64 {
        self.tour_cost
    }

    pub fn state(&self, world: &World) -> AntState {
        if self.visited.is_empty() {
            AntState::Ready
        } else if self.has_returned_to_start() {
            AntState::Done
        } else if self.can_move(world) {
            AntState::Moving
        } else {
            AntState::Returning
        }
    }

    /// Whether any edge from the current node leads to an unvisited node.
    pub fn can_move(&self, world: &World) -> bool {
        world
            .adjacent_edges(self.current)
            .any(|(_, edge)| self.is_feasible(world, edge))
    }

    /// True once the ant stands on the node it started from, after at least
    /// one move.
    pub fn has_returned_to_start(&self) -> bool {
        self.visited.first() == Some(&self.current)
    }

    /// Edges from the current node to unvisited nodes, in edge creation order.
    pub fn feasible_edges(&self, world: &World) -> Vec<EdgeIndex> {
        world
            .adjacent_edges(self.current)
            .filter(|(_, edge)| self.is_feasible(world, edge))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn is_feasible(&self, world: &World, edge: &Edge) -> bool {
        !self.is_visited(world, edge.first()) && !self.is_visited(world, edge.second())
    }

    fn is_visited(&self, world: &World, node: NodeId) -> bool {
        world
            .position(node)
            .and_then(|pos| self.visited_mask.get(pos).copied())
            .unwrap_or(false)
    }

    /// Ant System move: roulette-wheel selection over the feasible edges.
    ///
    /// Returns the committed edge, or `None` when no feasible edge exists.
    pub fn do_next_move_as<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        alpha: f64,
        beta: f64,
        rng: &mut R,
    ) -> Option<EdgeIndex> {
        let feasible = self.feasible_edges(world);
        if feasible.is_empty() {
            return None;
        }
        let draw = rng.random::<f64>();
        let chosen = select_roulette(world, &feasible, alpha, beta, draw);
        self.commit(world, chosen);
        Some(chosen)
    }

    /// Ant Colony System move.
    ///
    /// With probability `q0` takes the most desirable feasible edge,
    /// otherwise falls back to [`do_next_move_as`](Self::do_next_move_as).
    pub fn do_next_move_acs<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        q0: f64,
        alpha: f64,
        beta: f64,
        rng: &mut R,
    ) -> Option<EdgeIndex> {
        if !self.can_move(world) {
            return None;
        }
        if rng.random::<f64>() < q0 {
            let feasible = self.feasible_edges(world);
            let chosen = select_greedy(world, &feasible, alpha, beta)?;
            self.commit(world, chosen);
            Some(chosen)
        } else {
            self.do_next_move_as(world, alpha, beta, rng)
        }
    }

    /// Walks the edge from the current node back to the start, closing the
    /// cycle. The node left behind is appended to the visited nodes.
    ///
    /// `None` when nothing has been visited, the ant is already home, or no
    /// such edge exists.
    pub fn do_final_move_to_start(&mut self, world: &World) -> Option<EdgeIndex> {
        let start = *self.visited.first()?;
        if self.current == start {
            return None;
        }
        let idx = world.edge_between(self.current, start)?;
        if let Some(pos) = world.position(self.current) {
            self.visited_mask[pos] = true;
        }
        self.visited.push(self.current);
        self.tour.push(idx);
        self.tour_cost += world.edge(idx).weight();
        self.current = start;
        Some(idx)
    }

    fn commit(&mut self, world: &World, idx: EdgeIndex) {
        let edge = world.edge(idx);
        if let Some(pos) = world.position(self.current) {
            self.visited_mask[pos] = true;
        }
        self.visited.push(self.current);
        self.tour.push(idx);
        self.tour_cost += edge.weight();
        self.current = edge.other(self.current);
    }
}

/// Picks the first edge whose cumulative probability reaches `draw`.
///
/// A degenerate distribution (zero or non-finite total) selects uniformly
/// with the same draw.
fn select_roulette(
    world: &World,
    feasible: &[EdgeIndex],
    alpha: f64,
    beta: f64,
    draw: f64,
) -> EdgeIndex {
    let weights: Vec<f64> = feasible
        .iter()
        .map(|&idx| world.edge(idx).desirability(alpha, beta))
        .collect();
    let total: f64 = weights.iter().sum();
    let last = feasible[feasible.len() - 1];

    if !total.is_finite() || total <= 0.0 {
        let slot = (draw * feasible.len() as f64) as usize;
        return feasible.get(slot).copied().unwrap_or(last);
    }

    let mut cumulative = 0.0;
    for (&idx, weight) in feasible.iter().zip(&weights) {
        cumulative += weight / total;
        if cumulative >= draw {
            return idx;
        }
    }
    // Rounding can leave the final cumulative value just below 1.
    last
}

/// The feasible edge with the highest desirability; ties keep the first.
fn select_greedy(world: &World, feasible: &[EdgeIndex], alpha: f64, beta: f64) -> Option<EdgeIndex> {
    let mut best: Option<(EdgeIndex, f64)> = None;
    for &idx in feasible {
        let value = world.edge(idx).desirability(alpha, beta);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acs::{InitialPheromone, Node};
    use proptest::prelude::*;
    use u_numflow::random::create_rng;

    fn square_world() -> World {
        let mut world = World::complete(vec![
            Node::new(0, 0.0, 0.0),
            Node::new(1, 1.0, 0.0),
            Node::new(2, 1.0, 1.0),
            Node::new(3, 0.0, 1.0),
        ])
        .unwrap();
        world
            .init_pheromone(&InitialPheromone::Constant(0.1))
            .unwrap();
        world
    }

    fn run_to_completion<R: Rng>(ant: &mut Ant, world: &World, q0: f64, rng: &mut R) {
        while ant.can_move(world) {
            ant.do_next_move_acs(world, q0, 1.0, 2.0, rng).unwrap();
        }
        ant.do_final_move_to_start(world).unwrap();
    }

    #[test]
    fn test_state_machine() {
        let world = square_world();
        let mut rng = create_rng(1);
        let mut ant = Ant::new(0, 0, &world);
        assert_eq!(ant.state(&world), AntState::Ready);
        assert!(!ant.has_returned_to_start());

        ant.do_next_move_as(&world, 1.0, 2.0, &mut rng).unwrap();
        assert_eq!(ant.state(&world), AntState::Moving);

        while ant.can_move(&world) {
            ant.do_next_move_as(&world, 1.0, 2.0, &mut rng).unwrap();
        }
        assert_eq!(ant.state(&world), AntState::Returning);
        assert_eq!(ant.visited_nodes().len(), 3);

        let last = ant.current_node();
        ant.do_final_move_to_start(&world).unwrap();
        assert_eq!(ant.state(&world), AntState::Done);
        assert!(ant.has_returned_to_start());
        assert_eq!(ant.current_node(), 0);
        assert_eq!(ant.tour().len(), 4);
        assert_eq!(ant.visited_nodes().len(), 4);
        assert_eq!(ant.visited_nodes().last(), Some(&last));
    }

    #[test]
    fn test_moves_are_noops_when_stuck() {
        let world = square_world();
        let mut rng = create_rng(2);
        let mut ant = Ant::new(0, 0, &world);
        run_to_completion(&mut ant, &world, 0.5, &mut rng);

        let cost = ant.tour_cost();
        assert!(ant.do_next_move_acs(&world, 0.5, 1.0, 2.0, &mut rng).is_none());
        assert!(ant.do_next_move_as(&world, 1.0, 2.0, &mut rng).is_none());
        assert!(ant.do_final_move_to_start(&world).is_none());
        assert_eq!(ant.tour_cost(), cost);
        assert_eq!(ant.tour().len(), 4);
    }

    #[test]
    fn test_final_move_needs_a_start() {
        let world = square_world();
        let mut ant = Ant::new(0, 2, &world);
        assert!(ant.do_final_move_to_start(&world).is_none());
        assert_eq!(ant.current_node(), 2);
    }

    #[test]
    fn test_reset_keeps_identity() {
        let world = square_world();
        let mut rng = create_rng(3);
        let mut ant = Ant::new(7, 0, &world);
        run_to_completion(&mut ant, &world, 0.9, &mut rng);

        ant.reset(3);
        assert_eq!(ant.id(), 7);
        assert_eq!(ant.current_node(), 3);
        assert!(ant.visited_nodes().is_empty());
        assert!(ant.tour().is_empty());
        assert_eq!(ant.tour_cost(), 0.0);
        assert_eq!(ant.feasible_edges(&world).len(), 3);
    }

    #[test]
    fn test_exploitation_prefers_short_edges() {
        // From corner 0 the diagonal (0,2) is the only long edge.
        let world = square_world();
        let mut rng = create_rng(4);
        for _ in 0..20 {
            let mut ant = Ant::new(0, 0, &world);
            let edge = ant
                .do_next_move_acs(&world, 1.0, 1.0, 2.0, &mut rng)
                .unwrap();
            // Ties between (0,1) and (0,3) keep the first created edge.
            assert_eq!(world.edge(edge).key(), crate::acs::EdgeKey::new(0, 1));
        }
    }

    #[test]
    fn test_roulette_walks_cumulative_distribution() {
        let world = square_world();
        // From node 0: (0,1) w=1, (0,2) w=1.414, (0,3) w=1.
        let feasible: Vec<EdgeIndex> = world.adjacent_edge_indices(0).to_vec();
        let w = |i: EdgeIndex| world.edge(i).desirability(1.0, 2.0);
        let total: f64 = feasible.iter().map(|&i| w(i)).sum();
        let p0 = w(feasible[0]) / total;
        let p1 = w(feasible[1]) / total;

        assert_eq!(select_roulette(&world, &feasible, 1.0, 2.0, 0.0), feasible[0]);
        assert_eq!(select_roulette(&world, &feasible, 1.0, 2.0, p0), feasible[0]);
        assert_eq!(
            select_roulette(&world, &feasible, 1.0, 2.0, p0 + 1e-9),
            feasible[1]
        );
        assert_eq!(
            select_roulette(&world, &feasible, 1.0, 2.0, p0 + p1 + 1e-9),
            feasible[2]
        );
        assert_eq!(select_roulette(&world, &feasible, 1.0, 2.0, 1.0), feasible[2]);
    }

    #[test]
    fn test_greedy_selection_first_max() {
        let world = square_world();
        let feasible: Vec<EdgeIndex> = world.adjacent_edge_indices(0).to_vec();
        assert_eq!(select_greedy(&world, &feasible, 1.0, 2.0), Some(feasible[0]));
        assert_eq!(select_greedy(&world, &[], 1.0, 2.0), None);
        // Without the heuristic term every edge ties.
        assert_eq!(select_greedy(&world, &feasible[1..], 1.0, 0.0), Some(feasible[1]));
    }

    proptest! {
        #[test]
        fn prop_closed_tour_is_hamiltonian(seed in any::<u64>(), q0 in 0.0f64..=1.0, start in 0i64..4) {
            let world = square_world();
            let mut rng = create_rng(seed);
            let mut ant = Ant::new(0, start, &world);

            while ant.can_move(&world) {
                ant.do_next_move_acs(&world, q0, 1.0, 2.0, &mut rng).unwrap();
                let sum: f64 = ant.tour_edges(&world).map(|e| e.weight()).sum();
                prop_assert!((ant.tour_cost() - sum).abs() < 1e-12);
            }
            ant.do_final_move_to_start(&world).unwrap();

            prop_assert!(ant.has_returned_to_start());
            prop_assert_eq!(ant.tour().len(), world.node_count());
            let mut seen = ant.visited_nodes().to_vec();
            seen.sort_unstable();
            prop_assert_eq!(seen, vec![0, 1, 2, 3]);
            let sum: f64 = ant.tour_edges(&world).map(|e| e.weight()).sum();
            prop_assert!((ant.tour_cost() - sum).abs() < 1e-12);
        }
    }
}
