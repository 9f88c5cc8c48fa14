use std::time::Duration;

/// Minimum time a processing view stays up when the backend answers quickly.
pub const DEFAULT_MIN_DISPLAY_MS: u64 = 2000;

/// Settings shared by every completion gate built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    pub min_display: Duration,
}

impl GateConfig {
    pub fn from_millis(millis: u64) -> Self {
        Self {
            min_display: Duration::from_millis(millis),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::from_millis(DEFAULT_MIN_DISPLAY_MS)
    }
}
