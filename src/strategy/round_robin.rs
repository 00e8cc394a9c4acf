use super::{SelectionError, Strategy};
use crate::technique::Technique;
use rand::Rng;

/// Cycles through the pool in order.
///
/// The cursor is not tied to pool identity: if the pool's composition or order
/// changes between calls the cursor keeps advancing over whatever pool it is
/// handed next, so a technique may be skipped or repeated once after a change.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the next call will read from (before the modulo)
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Strategy for RoundRobin {
    fn select_with<'a, R: Rng + ?Sized>(
        &mut self,
        pool: &'a [Technique],
        _rng: &mut R,
    ) -> Result<&'a Technique, SelectionError> {
        if pool.is_empty() {
            return Err(SelectionError::EmptyPool);
        }

        let index = self.cursor % pool.len();
        self.cursor = (index + 1) % pool.len();
        Ok(&pool[index])
    }
}
