use super::{SelectionError, Strategy};
use crate::technique::Technique;
use rand::Rng;

/// Draws each technique with probability proportional to its `weight`.
///
/// Non-positive weights never win a draw. When no technique carries a positive
/// weight, or floating-point drift leaves the cursor above zero after the last
/// technique, the first pool element is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRandom;

impl Strategy for WeightedRandom {
    fn select_with<'a, R: Rng + ?Sized>(
        &mut self,
        pool: &'a [Technique],
        rng: &mut R,
    ) -> Result<&'a Technique, SelectionError> {
        let first = pool.first().ok_or(SelectionError::EmptyPool)?;

        let total_weight: f64 = pool
            .iter()
            .map(|t| t.weight)
            .filter(|w| w.is_finite() && *w > 0.0)
            .sum();

        if !(total_weight.is_finite() && total_weight > 0.0) {
            return Ok(first);
        }

        let draw = rng.random_range(0.0..total_weight);
        Ok(pick(pool, draw).unwrap_or(first))
    }
}

/// Walk the pool subtracting weights from `cursor`; the technique that takes
/// the cursor to zero or below wins.
pub(crate) fn pick(pool: &[Technique], mut cursor: f64) -> Option<&Technique> {
    for technique in pool {
        let weight = technique.weight;
        if !(weight.is_finite() && weight > 0.0) {
            continue;
        }
        cursor -= weight;
        if cursor <= 0.0 {
            return Some(technique);
        }
    }
    None
}
