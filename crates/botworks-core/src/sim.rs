//! Simulation configuration and run outcomes.

use crate::error::ConfigError;
use crate::fixed::{Fixed64, Ticks};

/// Robots created when the warehouse is built: one specialized ore miner
/// and one generalist crystal miner.
pub const INITIAL_FLEET_SIZE: u32 = 2;

/// Configuration for a simulation run. Chosen at warehouse construction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimConfig {
    /// Fleet size at which the simulation self-terminates.
    pub robot_goal: u32,

    /// Ticks per simulated time unit. Scales every task duration
    /// uniformly; affects pacing granularity only, never logical behavior.
    /// The default of 10 makes every one-decimal duration land on whole
    /// ticks.
    pub ticks_per_unit: u64,

    /// Seed for the deterministic RNG (breakage draws, mining durations).
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            robot_goal: 30,
            ticks_per_unit: 10,
            seed: 0xB07_F00D,
        }
    }
}

impl SimConfig {
    /// A config with the given recruitment goal and default pacing/seed.
    pub fn with_goal(robot_goal: u32) -> Self {
        Self {
            robot_goal,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.robot_goal < INITIAL_FLEET_SIZE {
            return Err(ConfigError::GoalTooSmall {
                goal: self.robot_goal,
            });
        }
        if self.ticks_per_unit == 0 {
            return Err(ConfigError::ZeroTickScale);
        }
        Ok(())
    }

    /// Convert a duration in time units to ticks, rounding to nearest.
    /// One-decimal durations are not exactly representable in binary
    /// fixed-point; rounding keeps 0.1-unit granularity lossless.
    pub(crate) fn units_to_ticks(&self, units: Fixed64) -> Ticks {
        (units * Fixed64::from_num(self.ticks_per_unit))
            .round()
            .to_num::<Ticks>()
    }
}

/// Why a driving loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The fleet reached its goal and the mission-accomplished event has
    /// been delivered.
    Accomplished,
    /// The next pending wakeup lies beyond the deadline.
    DeadlineReached,
    /// No pending work remains.
    Idle,
}
