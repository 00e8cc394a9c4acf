use super::{SelectionError, Strategy};
use crate::technique::{Priority, Technique};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Chooses uniformly among the techniques of the highest priority present.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityBased;

impl PriorityBased {
    /// Techniques of the highest non-empty priority bucket, in pool order
    pub fn top_bucket(pool: &[Technique]) -> Vec<&Technique> {
        [Priority::High, Priority::Medium, Priority::Low]
            .into_iter()
            .map(|level| {
                pool.iter()
                    .filter(|t| t.priority == level)
                    .collect::<Vec<_>>()
            })
            .find(|bucket| !bucket.is_empty())
            .unwrap_or_default()
    }
}

impl Strategy for PriorityBased {
    fn select_with<'a, R: Rng + ?Sized>(
        &mut self,
        pool: &'a [Technique],
        rng: &mut R,
    ) -> Result<&'a Technique, SelectionError> {
        let bucket = Self::top_bucket(pool);
        bucket
            .choose(rng)
            .copied()
            .ok_or(SelectionError::EmptyPool)
    }
}
