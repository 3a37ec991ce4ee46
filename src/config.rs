use std::time::Duration;

use crate::error::PackError;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

/// Caps on the height search. The search has no convergence proof, so every
/// run is bounded by an attempt count and optionally by wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub max_attempts: usize,
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn validate(&self) -> Result<(), PackError> {
        if self.max_attempts == 0 {
            return Err(PackError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.time_limit == Some(Duration::ZERO) {
            return Err(PackError::InvalidConfig(
                "time_limit must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
