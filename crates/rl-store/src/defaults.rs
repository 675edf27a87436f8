//! Default filter values

use rl_common::TimeCommitmentRange;
use rl_config::DefaultsConfig;

pub trait DefaultsProvider: Send + Sync {
    fn time_commitment_range(&self) -> TimeCommitmentRange;
}

/// Defaults fixed at construction
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDefaults {
    time_commitment: TimeCommitmentRange,
}

impl StaticDefaults {
    pub fn new(time_commitment: TimeCommitmentRange) -> Self {
        Self { time_commitment }
    }

    pub fn from_config(config: &DefaultsConfig) -> Self {
        Self::new(TimeCommitmentRange::new(
            config.time_commitment_min,
            config.time_commitment_max,
        ))
    }
}

impl DefaultsProvider for StaticDefaults {
    fn time_commitment_range(&self) -> TimeCommitmentRange {
        self.time_commitment
    }
}
