//! ACS configuration.

use std::fmt;
use std::str::FromStr;

use super::types::NodeId;
use crate::error::AcoError;

/// Source of the initial (and floor) pheromone level `tau0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InitialPheromone {
    /// Every edge starts at this value, which is also the local-update floor.
    Constant(f64),

    /// Derived from the nearest-neighbour tour cost `C`: edges start at
    /// `1 / (|nodes| * C)` and the floor is `1 / C`.
    #[default]
    Greedy,
}

impl FromStr for InitialPheromone {
    type Err = AcoError;

    /// Accepts the literal `greedy` or any number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "greedy" {
            return Ok(InitialPheromone::Greedy);
        }
        s.parse::<f64>()
            .map(InitialPheromone::Constant)
            .map_err(|_| AcoError::MalformedTau0(s.to_string()))
    }
}

impl fmt::Display for InitialPheromone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialPheromone::Constant(v) => write!(f, "{v}"),
            InitialPheromone::Greedy => f.write_str("greedy"),
        }
    }
}

/// Parameters of the Ant Colony System.
///
/// # Examples
///
/// ```
/// use u_antcolony::acs::{AcsConfig, InitialPheromone};
///
/// let config = AcsConfig::default()
///     .with_alpha(1.0)
///     .with_beta(2.0)
///     .with_ant_count(5)
///     .with_tau0(InitialPheromone::Constant(0.1))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcsConfig {
    /// Pheromone influence exponent.
    pub alpha: f64,

    /// Heuristic (inverse weight) influence exponent.
    pub beta: f64,

    /// Local pheromone decay rate in `[0, 1]`.
    pub rho: f64,

    /// Global reinforcement intensity `Q`.
    pub q: f64,

    /// Probability of greedy exploitation in `[0, 1]`.
    pub q0: f64,

    /// Global evaporation rate in `[0, 1]`.
    pub alpha_decay: f64,

    /// Number of ants in the colony.
    pub ant_count: usize,

    pub tau0: InitialPheromone,

    /// Fixed start node for every ant. `None` draws a random start per ant
    /// per iteration.
    pub start_node: Option<NodeId>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AcsConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 2.0,
            rho: 0.1,
            q: 1.0,
            q0: 0.9,
            alpha_decay: 0.1,
            ant_count: 10,
            tau0: InitialPheromone::Greedy,
            start_node: None,
            seed: None,
        }
    }
}

impl AcsConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn with_q(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    pub fn with_q0(mut self, q0: f64) -> Self {
        self.q0 = q0;
        self
    }

    pub fn with_alpha_decay(mut self, alpha_decay: f64) -> Self {
        self.alpha_decay = alpha_decay;
        self
    }

    pub fn with_ant_count(mut self, n: usize) -> Self {
        self.ant_count = n;
        self
    }

    pub fn with_tau0(mut self, tau0: InitialPheromone) -> Self {
        self.tau0 = tau0;
        self
    }

    pub fn with_start_node(mut self, id: NodeId) -> Self {
        self.start_node = Some(id);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates parameter ranges.
    ///
    /// The start node is checked against the graph by
    /// [`AcsSolver::new`](super::AcsSolver::new).
    pub fn validate(&self) -> Result<(), AcoError> {
        non_negative("alpha", self.alpha)?;
        non_negative("beta", self.beta)?;
        unit_range("rho", self.rho)?;
        unit_range("q0", self.q0)?;
        unit_range("alpha_decay", self.alpha_decay)?;
        if !self.q.is_finite() || self.q <= 0.0 {
            return Err(AcoError::NonPositiveIntensity(self.q));
        }
        if self.ant_count < 1 {
            return Err(AcoError::NoAnts);
        }
        if let InitialPheromone::Constant(value) = self.tau0 {
            if !value.is_finite() || value <= 0.0 {
                return Err(AcoError::InvalidTau0(value));
            }
        }
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), AcoError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AcoError::Negative { name, value })
    }
}

fn unit_range(name: &'static str, value: f64) -> Result<(), AcoError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AcoError::OutOfUnitRange { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AcsConfig::default();
        assert!((config.alpha - 1.0).abs() < 1e-10);
        assert!((config.beta - 2.0).abs() < 1e-10);
        assert_eq!(config.ant_count, 10);
        assert_eq!(config.tau0, InitialPheromone::Greedy);
        assert!(config.start_node.is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(AcsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_unit_ranges() {
        assert!(matches!(
            AcsConfig::default().with_rho(1.5).validate(),
            Err(AcoError::OutOfUnitRange { name: "rho", .. })
        ));
        assert!(matches!(
            AcsConfig::default().with_q0(-0.1).validate(),
            Err(AcoError::OutOfUnitRange { name: "q0", .. })
        ));
        assert!(matches!(
            AcsConfig::default().with_alpha_decay(f64::NAN).validate(),
            Err(AcoError::OutOfUnitRange {
                name: "alpha_decay",
                ..
            })
        ));
        // Bounds are inclusive.
        assert!(AcsConfig::default()
            .with_rho(0.0)
            .with_q0(1.0)
            .with_alpha_decay(1.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_exponents() {
        assert!(matches!(
            AcsConfig::default().with_beta(-2.0).validate(),
            Err(AcoError::Negative { name: "beta", .. })
        ));
    }

    #[test]
    fn test_validate_intensity_and_ants() {
        assert!(matches!(
            AcsConfig::default().with_q(0.0).validate(),
            Err(AcoError::NonPositiveIntensity(_))
        ));
        assert!(matches!(
            AcsConfig::default().with_ant_count(0).validate(),
            Err(AcoError::NoAnts)
        ));
    }

    #[test]
    fn test_validate_tau0() {
        let config = AcsConfig::default().with_tau0(InitialPheromone::Constant(-1.0));
        assert!(matches!(config.validate(), Err(AcoError::InvalidTau0(_))));
    }

    #[test]
    fn test_parse_initial_pheromone() {
        assert_eq!("greedy".parse::<InitialPheromone>().unwrap(), InitialPheromone::Greedy);
        assert_eq!(
            " 0.01 ".parse::<InitialPheromone>().unwrap(),
            InitialPheromone::Constant(0.01)
        );
        assert_eq!("3".parse::<InitialPheromone>().unwrap(), InitialPheromone::Constant(3.0));
        assert!(matches!(
            "Greedy".parse::<InitialPheromone>(),
            Err(AcoError::MalformedTau0(_))
        ));
        assert!(matches!(
            "lots".parse::<InitialPheromone>(),
            Err(AcoError::MalformedTau0(_))
        ));
    }

    #[test]
    fn test_initial_pheromone_display() {
        assert_eq!(InitialPheromone::Greedy.to_string(), "greedy");
        assert_eq!(InitialPheromone::Constant(0.5).to_string(), "0.5");
    }
}
