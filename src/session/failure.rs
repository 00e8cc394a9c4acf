/// Consecutive audio playback failures within the current session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioFailureCounter {
    consecutive: u32,
}

impl AudioFailureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure and return the new streak length
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn reset(&mut self) {
        self.consecutive = 0;
    }

    pub fn count(&self) -> u32 {
        self.consecutive
    }

    pub fn has_reached(&self, threshold: u32) -> bool {
        threshold > 0 && self.consecutive >= threshold
    }
}
