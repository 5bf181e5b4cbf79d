/// Domain-level task failures. These never cross component boundaries as
/// `Err` values thrown at a caller; the warehouse wraps them into failure
/// events and the robot's retry loop is the sole recovery mechanism.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize,
)]
pub enum TaskError {
    /// An assemble/sell/recruit was attempted against an unaffordable ledger.
    #[error("not enough resources")]
    InsufficientResources,

    /// The assembly draw failed and destroyed the ore input.
    #[error("ore unit broke during assembly")]
    Breakage,
}

/// Construction-time configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The recruitment goal is below the initial fleet size.
    #[error("robot goal {goal} is below the initial fleet size of 2")]
    GoalTooSmall { goal: u32 },

    /// The tick scale must be at least one tick per time unit.
    #[error("ticks_per_unit must be non-zero")]
    ZeroTickScale,
}
