//! Technique selection strategies.
//!
//! A strategy maps a non-empty pool to one technique. The set of strategies is
//! closed; [`SelectionStrategy`] dispatches over it and is built from a
//! [`StrategyType`] by [`SelectionStrategy::new`].

pub mod priority;
pub mod round_robin;
pub mod weighted;


pub use priority::PriorityBased;
pub use round_robin::RoundRobin;
pub use weighted::WeightedRandom;

use crate::technique::Technique;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised by a strategy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Cannot select from an empty technique pool")]
    EmptyPool,
}

/// Common contract of every selection algorithm
pub trait Strategy {
    /// Pick one technique from `pool` using `rng` for any randomness
    fn select_with<'a, R: Rng + ?Sized>(
        &mut self,
        pool: &'a [Technique],
        rng: &mut R,
    ) -> Result<&'a Technique, SelectionError>;
}

/// Identifies a strategy variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyType {
    #[default]
    WeightedRandom,
    RoundRobin,
    PriorityBased,
}

impl StrategyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::WeightedRandom => "weighted-random",
            StrategyType::RoundRobin => "round-robin",
            StrategyType::PriorityBased => "priority-based",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted-random" | "weighted" | "random" => Ok(StrategyType::WeightedRandom),
            "round-robin" | "roundrobin" | "sequential" => Ok(StrategyType::RoundRobin),
            "priority-based" | "priority" => Ok(StrategyType::PriorityBased),
            other => Err(format!(
                "unknown strategy '{}' (expected weighted-random, round-robin or priority-based)",
                other
            )),
        }
    }
}

/// The active strategy, one of the closed set of variants
#[derive(Debug, Clone)]
pub enum SelectionStrategy {
    WeightedRandom(WeightedRandom),
    RoundRobin(RoundRobin),
    PriorityBased(PriorityBased),
}

impl SelectionStrategy {
    /// Build a fresh strategy of the given type
    pub fn new(kind: StrategyType) -> Self {
        match kind {
            StrategyType::WeightedRandom => SelectionStrategy::WeightedRandom(WeightedRandom),
            StrategyType::RoundRobin => SelectionStrategy::RoundRobin(RoundRobin::new()),
            StrategyType::PriorityBased => SelectionStrategy::PriorityBased(PriorityBased),
        }
    }

    pub fn kind(&self) -> StrategyType {
        match self {
            SelectionStrategy::WeightedRandom(_) => StrategyType::WeightedRandom,
            SelectionStrategy::RoundRobin(_) => StrategyType::RoundRobin,
            SelectionStrategy::PriorityBased(_) => StrategyType::PriorityBased,
        }
    }

    /// Select using the thread-local generator
    pub fn select<'a>(&mut self, pool: &'a [Technique]) -> Result<&'a Technique, SelectionError> {
        let mut rng = rand::rng();
        self.select_with(pool, &mut rng)
    }
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::new(StrategyType::default())
    }
}

impl Strategy for SelectionStrategy {
    fn select_with<'a, R: Rng + ?Sized>(
        &mut self,
        pool: &'a [Technique],
        rng: &mut R,
    ) -> Result<&'a Technique, SelectionError> {
        match self {
            SelectionStrategy::WeightedRandom(s) => s.select_with(pool, rng),
            SelectionStrategy::RoundRobin(s) => s.select_with(pool, rng),
            SelectionStrategy::PriorityBased(s) => s.select_with(pool, rng),
        }
    }
}
