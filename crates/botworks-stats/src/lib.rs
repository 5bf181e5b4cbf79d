//! Run statistics for the Botworks engine.
//!
//! Listens to core events and aggregates them into the counters a dashboard
//! would display: production and breakage totals, credit flow, fleet
//! growth, and a per-robot activity board. The aggregator is a plain
//! observer -- it consumes events and never mutates simulation state.
//!
//! # Usage
//!
//! ```ignore
//! let stats = SharedRunStats::new();
//! warehouse.subscribe("stats", stats.observer());
//! warehouse.start();
//! warehouse.run_until(budget);
//! let snapshot = stats.get();
//! println!("assembled {} widgets", snapshot.widgets_assembled());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use botworks_core::event::Event;
use botworks_core::fixed::Fixed64;
use botworks_core::id::RobotId;
use botworks_core::query::{InventorySnapshot, RobotSnapshot};

// ---------------------------------------------------------------------------
// RunStats
// ---------------------------------------------------------------------------

/// Aggregated counters for one simulation run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    ore_mined: u64,
    crystal_mined: u64,
    widgets_assembled: u64,
    breakages: u64,
    widgets_sold: u64,
    credits_earned: u64,
    sales_failed: u64,
    robots_recruited: u64,
    recruits_failed: u64,
    order_changes: u64,
    game_started: bool,
    mission_accomplished: bool,
    latest_inventory: Option<InventorySnapshot>,
    /// Fleet sizes observed in arrival order (index 0 = first report).
    fleet_timeline: Vec<u32>,
    /// Last known state per robot, in arrival order.
    board: Vec<(RobotId, RobotSnapshot)>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the counters.
    pub fn process_event(&mut self, event: &Event) {
        match event {
            Event::GameStarted => self.game_started = true,
            Event::OreMiningSucceeded { .. } => self.ore_mined += 1,
            Event::CrystalMiningSucceeded { .. } => self.crystal_mined += 1,
            Event::AssemblySucceeded { .. } => self.widgets_assembled += 1,
            Event::AssemblyFailed { .. } => self.breakages += 1,
            Event::SaleSucceeded { amount, .. } => {
                self.widgets_sold += u64::from(*amount);
                self.credits_earned += u64::from(*amount);
            }
            Event::SaleFailed { .. } => self.sales_failed += 1,
            Event::RecruitSucceeded { .. } => self.robots_recruited += 1,
            Event::RecruitFailed { .. } => self.recruits_failed += 1,
            Event::OrderChangeSucceeded { .. } => self.order_changes += 1,
            Event::InventoryReport { inventory } => {
                if self
                    .latest_inventory
                    .map(|last| last.robots != inventory.robots)
                    .unwrap_or(true)
                {
                    self.fleet_timeline.push(inventory.robots);
                }
                self.latest_inventory = Some(*inventory);
            }
            Event::RobotArrived { robot } | Event::RobotStateSent { robot } => {
                self.update_board(robot);
            }
            Event::MissionAccomplished => self.mission_accomplished = true,
            _ => {}
        }
    }

    fn update_board(&mut self, snapshot: &RobotSnapshot) {
        if let Some(slot) = self.board.iter_mut().find(|(id, _)| *id == snapshot.id) {
            slot.1 = snapshot.clone();
        } else {
            self.board.push((snapshot.id, snapshot.clone()));
        }
    }

    // -- Accessors --

    pub fn ore_mined(&self) -> u64 {
        self.ore_mined
    }

    pub fn crystal_mined(&self) -> u64 {
        self.crystal_mined
    }

    pub fn widgets_assembled(&self) -> u64 {
        self.widgets_assembled
    }

    pub fn breakages(&self) -> u64 {
        self.breakages
    }

    pub fn widgets_sold(&self) -> u64 {
        self.widgets_sold
    }

    pub fn credits_earned(&self) -> u64 {
        self.credits_earned
    }

    pub fn sales_failed(&self) -> u64 {
        self.sales_failed
    }

    pub fn robots_recruited(&self) -> u64 {
        self.robots_recruited
    }

    pub fn recruits_failed(&self) -> u64 {
        self.recruits_failed
    }

    pub fn order_changes(&self) -> u64 {
        self.order_changes
    }

    pub fn game_started(&self) -> bool {
        self.game_started
    }

    pub fn mission_accomplished(&self) -> bool {
        self.mission_accomplished
    }

    /// The most recent inventory report, if any.
    pub fn latest_inventory(&self) -> Option<InventorySnapshot> {
        self.latest_inventory
    }

    /// Fleet sizes in the order they were first reported.
    pub fn fleet_timeline(&self) -> &[u32] {
        &self.fleet_timeline
    }

    /// Last known state per robot, in arrival order.
    pub fn board(&self) -> &[(RobotId, RobotSnapshot)] {
        &self.board
    }

    /// Fraction of assembly attempts that produced a widget, in [0, 1].
    /// Returns zero before the first attempt.
    pub fn assembly_success_rate(&self) -> Fixed64 {
        let attempts = self.widgets_assembled + self.breakages;
        if attempts == 0 {
            return Fixed64::ZERO;
        }
        Fixed64::from_num(self.widgets_assembled) / Fixed64::from_num(attempts)
    }
}

// ---------------------------------------------------------------------------
// SharedRunStats -- observer adapter
// ---------------------------------------------------------------------------

/// A [`RunStats`] behind shared ownership, so the same aggregator can be
/// registered as a bus observer and queried by the host afterwards.
#[derive(Debug, Clone, Default)]
pub struct SharedRunStats {
    inner: Rc<RefCell<RunStats>>,
}

impl SharedRunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A boxed callback suitable for `Warehouse::subscribe`.
    pub fn observer(&self) -> Box<dyn FnMut(&Event)> {
        let inner = self.inner.clone();
        Box::new(move |event: &Event| inner.borrow_mut().process_event(event))
    }

    /// A copy of the current counters.
    pub fn get(&self) -> RunStats {
        self.inner.borrow().clone()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use botworks_core::error::TaskError;
    use botworks_core::task::Task;

    fn inventory(robots: u32) -> InventorySnapshot {
        InventorySnapshot {
            robots,
            ore: 0,
            crystal: 0,
            widgets: 0,
            credits: 0,
            credits_spent: 0,
            wasted_ore: 0,
        }
    }

    #[test]
    fn counts_production_events() {
        let mut stats = RunStats::new();
        let robot = RobotId::default();
        stats.process_event(&Event::OreMiningSucceeded { robot });
        stats.process_event(&Event::OreMiningSucceeded { robot });
        stats.process_event(&Event::CrystalMiningSucceeded { robot });
        stats.process_event(&Event::AssemblySucceeded { robot });
        stats.process_event(&Event::AssemblyFailed {
            robot,
            error: TaskError::Breakage,
        });
        stats.process_event(&Event::SaleSucceeded { robot, amount: 5 });

        assert_eq!(stats.ore_mined(), 2);
        assert_eq!(stats.crystal_mined(), 1);
        assert_eq!(stats.widgets_assembled(), 1);
        assert_eq!(stats.breakages(), 1);
        assert_eq!(stats.widgets_sold(), 5);
        assert_eq!(stats.credits_earned(), 5);
        assert_eq!(stats.assembly_success_rate(), Fixed64::from_num(0.5));
    }

    #[test]
    fn fleet_timeline_records_size_changes_once() {
        let mut stats = RunStats::new();
        stats.process_event(&Event::InventoryReport {
            inventory: inventory(2),
        });
        stats.process_event(&Event::InventoryReport {
            inventory: inventory(2),
        });
        stats.process_event(&Event::InventoryReport {
            inventory: inventory(3),
        });
        assert_eq!(stats.fleet_timeline(), &[2, 3]);
    }

    #[test]
    fn board_tracks_latest_robot_state() {
        let mut stats = RunStats::new();
        let snapshot = RobotSnapshot {
            id: RobotId::default(),
            processing: Task::ResumeMission,
            pending: Task::MineOre,
            specialized: true,
        };
        stats.process_event(&Event::RobotArrived {
            robot: snapshot.clone(),
        });
        let updated = RobotSnapshot {
            processing: Task::MineOre,
            ..snapshot.clone()
        };
        stats.process_event(&Event::RobotStateSent {
            robot: updated.clone(),
        });

        assert_eq!(stats.board().len(), 1);
        assert_eq!(stats.board()[0].1, updated);
    }

    #[test]
    fn shared_stats_feed_through_observer() {
        let shared = SharedRunStats::new();
        let mut observer = shared.observer();
        observer(&Event::GameStarted);
        observer(&Event::MissionAccomplished);
        let stats = shared.get();
        assert!(stats.game_started());
        assert!(stats.mission_accomplished());
    }

    #[test]
    fn success_rate_is_zero_before_attempts() {
        assert_eq!(RunStats::new().assembly_success_rate(), Fixed64::ZERO);
    }
}
