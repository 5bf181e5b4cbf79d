//! Typed simulation events and the subscription registry.
//!
//! Every externally meaningful state change travels as an [`Event`] on the
//! bus. Delivery is always deferred: publishing schedules a single delivery
//! unit on the cooperative scheduler, so a publisher never observes its own
//! publish synchronously, and the listeners for one event run as a unit
//! before any later event's listeners.
//!
//! # Subscriber Types
//!
//! - **Roles**: the ledger and the fleet supervisor. These need mutable
//!   access to warehouse state, so they are enum-dispatched by the
//!   warehouse during delivery rather than stored as closures.
//! - **Observers**: boxed read-only callbacks registered by the embedding
//!   host (UI, stats, tests). A panicking observer is isolated so it cannot
//!   corrupt delivery to the remaining listeners.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::TaskError;
use crate::id::RobotId;
use crate::query::{InventorySnapshot, RobotSnapshot};
use crate::task::Task;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. Produced once, never mutated, consumed by zero or
/// more listeners.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    /// The simulation has been started.
    GameStarted,

    // -- Mining --
    OreMiningStarted { robot: RobotId },
    OreMiningSucceeded { robot: RobotId },
    CrystalMiningStarted { robot: RobotId },
    CrystalMiningSucceeded { robot: RobotId },

    // -- Assembly --
    AssemblyStarted { robot: RobotId },
    AssemblyTried { robot: RobotId },
    AssemblySucceeded { robot: RobotId },
    AssemblyFailed { robot: RobotId, error: TaskError },

    // -- Sales --
    SaleStarted { robot: RobotId },
    SaleTried { robot: RobotId, amount: u32 },
    SaleSucceeded { robot: RobotId, amount: u32 },
    SaleFailed { robot: RobotId, error: TaskError },

    // -- Recruiting --
    RecruitStarted { robot: RobotId },
    RecruitTried { robot: RobotId, order: Task },
    RecruitSucceeded { robot: RobotId },
    RecruitFailed { robot: RobotId, error: TaskError },

    // -- Reassignment --
    OrderChangeStarted { robot: RobotId, new_order: Task },
    OrderChangeSucceeded { robot: RobotId },

    // -- Reports --
    InventoryReport { inventory: InventorySnapshot },
    RobotStateAsked { robot: RobotSnapshot },
    RobotStateSent { robot: RobotSnapshot },
    RobotArrived { robot: RobotSnapshot },

    // -- Coordination --
    WaitingOrders { robot: RobotId },
    MissionAccomplished,
}

/// Discriminant tag for event types, used for filtering and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameStarted,
    OreMiningStarted,
    OreMiningSucceeded,
    CrystalMiningStarted,
    CrystalMiningSucceeded,
    AssemblyStarted,
    AssemblyTried,
    AssemblySucceeded,
    AssemblyFailed,
    SaleStarted,
    SaleTried,
    SaleSucceeded,
    SaleFailed,
    RecruitStarted,
    RecruitTried,
    RecruitSucceeded,
    RecruitFailed,
    OrderChangeStarted,
    OrderChangeSucceeded,
    InventoryReport,
    RobotStateAsked,
    RobotStateSent,
    RobotArrived,
    WaitingOrders,
    MissionAccomplished,
}

impl Event {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::GameStarted => EventKind::GameStarted,
            Event::OreMiningStarted { .. } => EventKind::OreMiningStarted,
            Event::OreMiningSucceeded { .. } => EventKind::OreMiningSucceeded,
            Event::CrystalMiningStarted { .. } => EventKind::CrystalMiningStarted,
            Event::CrystalMiningSucceeded { .. } => EventKind::CrystalMiningSucceeded,
            Event::AssemblyStarted { .. } => EventKind::AssemblyStarted,
            Event::AssemblyTried { .. } => EventKind::AssemblyTried,
            Event::AssemblySucceeded { .. } => EventKind::AssemblySucceeded,
            Event::AssemblyFailed { .. } => EventKind::AssemblyFailed,
            Event::SaleStarted { .. } => EventKind::SaleStarted,
            Event::SaleTried { .. } => EventKind::SaleTried,
            Event::SaleSucceeded { .. } => EventKind::SaleSucceeded,
            Event::SaleFailed { .. } => EventKind::SaleFailed,
            Event::RecruitStarted { .. } => EventKind::RecruitStarted,
            Event::RecruitTried { .. } => EventKind::RecruitTried,
            Event::RecruitSucceeded { .. } => EventKind::RecruitSucceeded,
            Event::RecruitFailed { .. } => EventKind::RecruitFailed,
            Event::OrderChangeStarted { .. } => EventKind::OrderChangeStarted,
            Event::OrderChangeSucceeded { .. } => EventKind::OrderChangeSucceeded,
            Event::InventoryReport { .. } => EventKind::InventoryReport,
            Event::RobotStateAsked { .. } => EventKind::RobotStateAsked,
            Event::RobotStateSent { .. } => EventKind::RobotStateSent,
            Event::RobotArrived { .. } => EventKind::RobotArrived,
            Event::WaitingOrders { .. } => EventKind::WaitingOrders,
            Event::MissionAccomplished => EventKind::MissionAccomplished,
        }
    }

    /// The robot this event is scoped to, if any.
    pub fn robot(&self) -> Option<RobotId> {
        match self {
            Event::OreMiningStarted { robot }
            | Event::OreMiningSucceeded { robot }
            | Event::CrystalMiningStarted { robot }
            | Event::CrystalMiningSucceeded { robot }
            | Event::AssemblyStarted { robot }
            | Event::AssemblyTried { robot }
            | Event::AssemblySucceeded { robot }
            | Event::AssemblyFailed { robot, .. }
            | Event::SaleStarted { robot }
            | Event::SaleTried { robot, .. }
            | Event::SaleSucceeded { robot, .. }
            | Event::SaleFailed { robot, .. }
            | Event::RecruitStarted { robot }
            | Event::RecruitTried { robot, .. }
            | Event::RecruitSucceeded { robot }
            | Event::RecruitFailed { robot, .. }
            | Event::OrderChangeStarted { robot, .. }
            | Event::OrderChangeSucceeded { robot }
            | Event::WaitingOrders { robot } => Some(*robot),
            Event::RobotStateAsked { robot }
            | Event::RobotStateSent { robot }
            | Event::RobotArrived { robot } => Some(robot.id),
            Event::GameStarted
            | Event::InventoryReport { .. }
            | Event::MissionAccomplished => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// A read-only observer callback registered by the embedding host.
pub type ObserverFn = Box<dyn FnMut(&Event)>;

/// Internal components that receive events with mutable warehouse access.
/// Dispatched by the warehouse during delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Ledger,
    Supervisor,
}

enum Subscriber {
    Role(Role),
    Observer(ObserverFn),
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subscriber::Role(role) => write!(f, "Role({role:?})"),
            Subscriber::Observer(_) => write!(f, "Observer(<fn>)"),
        }
    }
}

/// The kind of a registered subscriber, as reported in a delivery roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RosterEntry {
    Role(Role),
    Observer,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// The subscription registry.
///
/// Exactly one subscriber per listener id; re-subscribing an id overwrites
/// the prior registration, and unsubscribing an unknown id is a no-op.
/// Delivery itself is driven by the warehouse, which snapshots the roster
/// and re-checks registration before each call so a handler that
/// unsubscribes mid-batch is honored.
#[derive(Debug, Default)]
pub struct EventBus {
    /// Registration order is delivery order.
    subscribers: Vec<(String, Subscriber)>,
    /// Observer callbacks that panicked during delivery.
    observer_panics: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer callback under `listener_id`, overwriting any
    /// prior registration for that id.
    pub fn subscribe(&mut self, listener_id: impl Into<String>, callback: ObserverFn) {
        self.insert(listener_id.into(), Subscriber::Observer(callback));
    }

    /// Remove the registration for `listener_id`. No-op for unknown ids.
    pub fn unsubscribe(&mut self, listener_id: &str) {
        self.subscribers.retain(|(id, _)| id.as_str() != listener_id);
    }

    /// Whether `listener_id` is currently registered.
    pub fn is_subscribed(&self, listener_id: &str) -> bool {
        self.subscribers
            .iter()
            .any(|(id, _)| id.as_str() == listener_id)
    }

    /// Number of registered subscribers (roles and observers).
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// How many observer callbacks have panicked during delivery.
    pub fn observer_panics(&self) -> u64 {
        self.observer_panics
    }

    /// Register an internal role subscriber (ledger, supervisor).
    pub(crate) fn attach_role(&mut self, listener_id: impl Into<String>, role: Role) {
        self.insert(listener_id.into(), Subscriber::Role(role));
    }

    /// Snapshot the current roster in registration order.
    pub(crate) fn roster(&self) -> Vec<(String, RosterEntry)> {
        self.subscribers
            .iter()
            .map(|(id, sub)| {
                let entry = match sub {
                    Subscriber::Role(role) => RosterEntry::Role(*role),
                    Subscriber::Observer(_) => RosterEntry::Observer,
                };
                (id.clone(), entry)
            })
            .collect()
    }

    /// Invoke the observer registered under `listener_id`, isolating a
    /// panic so it cannot disturb the rest of the delivery batch.
    pub(crate) fn notify_observer(&mut self, listener_id: &str, event: &Event) {
        let Some((_, sub)) = self
            .subscribers
            .iter_mut()
            .find(|(id, _)| id.as_str() == listener_id)
        else {
            return;
        };
        if let Subscriber::Observer(callback) = sub
            && catch_unwind(AssertUnwindSafe(|| callback(event))).is_err()
        {
            self.observer_panics += 1;
        }
    }

    fn insert(&mut self, listener_id: String, subscriber: Subscriber) {
        if let Some(slot) = self
            .subscribers
            .iter_mut()
            .find(|(id, _)| *id == listener_id)
        {
            slot.1 = subscriber;
        } else {
            self.subscribers.push((listener_id, subscriber));
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
