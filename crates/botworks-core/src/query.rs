//! Read-only snapshot types for inspecting simulation state.
//!
//! All types are owned copies -- no references into internal warehouse
//! storage -- so they can be handed to rendering code or serialized by an
//! embedding UI. Snapshots also travel inside events (`RobotArrived`,
//! `RobotStateSent`, `InventoryReport`).

use crate::id::RobotId;
use crate::task::Task;

/// An aggregated, read-only view of a single robot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RobotSnapshot {
    /// The robot's fleet id.
    pub id: RobotId,
    /// The task currently being processed (or a sentinel state).
    pub processing: Task,
    /// The next queued task.
    pub pending: Task,
    /// Whether the robot is permanently committed to one job family.
    pub specialized: bool,
}

/// An aggregated, read-only view of the warehouse inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InventorySnapshot {
    /// Current fleet size.
    pub robots: u32,
    /// Raw ore units in store.
    pub ore: u32,
    /// Raw crystal units in store.
    pub crystal: u32,
    /// Assembled widgets awaiting sale.
    pub widgets: u32,
    /// Current credit balance.
    pub credits: u64,
    /// Cumulative credits spent on recruiting.
    pub credits_spent: u64,
    /// Ore units destroyed by assembly breakage.
    pub wasted_ore: u32,
}
