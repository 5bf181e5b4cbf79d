//! A robot agent and its task state machine.
//!
//! A robot holds two order slots: `processing` (what it is doing right
//! now, possibly a sentinel state) and `pending` (the next queued task).
//! The struct only exposes the legal transitions; orchestration -- event
//! emission, duration scheduling, retry wakeups -- lives in the warehouse,
//! which drives these transitions from scheduled continuations.

use crate::id::RobotId;
use crate::query::RobotSnapshot;
use crate::task::Task;

/// A resource-gated request is retried this many times before a
/// non-specialized robot abandons it and asks for new orders instead.
/// Specialized robots retry indefinitely, reflecting their committed role.
pub const MAX_RESOURCE_RETRIES: u32 = 10;

/// A single agent with a task state machine. Created by the warehouse at
/// startup or on a successful recruit; lives for the remainder of the
/// simulation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Robot {
    id: RobotId,
    processing: Task,
    pending: Task,
    specialized: bool,
}

impl Robot {
    pub(crate) fn new(id: RobotId, order: Task, specialized: bool) -> Self {
        debug_assert!(order.is_assignable());
        Self {
            id,
            processing: Task::ResumeMission,
            pending: order,
            specialized,
        }
    }

    pub fn id(&self) -> RobotId {
        self.id
    }

    /// The task currently being processed, or a sentinel state.
    pub fn processing(&self) -> Task {
        self.processing
    }

    /// The next queued task.
    pub fn pending(&self) -> Task {
        self.pending
    }

    /// Whether the robot is permanently committed to one job family.
    pub fn is_specialized(&self) -> bool {
        self.specialized
    }

    /// Idle and seeking orders.
    pub fn is_idle(&self) -> bool {
        self.processing == Task::ResumeMission
    }

    /// Owned snapshot for events and observers.
    pub fn snapshot(&self) -> RobotSnapshot {
        RobotSnapshot {
            id: self.id,
            processing: self.processing,
            pending: self.pending,
            specialized: self.specialized,
        }
    }

    // -- Transitions (driven by the warehouse) --

    /// Start processing `task`.
    pub(crate) fn begin(&mut self, task: Task) {
        self.processing = task;
    }

    /// The task's duration elapsed: the just-processed task becomes the
    /// pending default (overwritten by the next order) and the robot goes
    /// back to seeking orders.
    pub(crate) fn finish(&mut self, just_processed: Task) {
        debug_assert!(just_processed.is_assignable());
        self.pending = just_processed;
        self.processing = Task::ResumeMission;
    }

    /// Block on an unaffordable resource check.
    pub(crate) fn begin_wait(&mut self) {
        self.processing = Task::WaitingResources;
    }

    /// Give up a starved request and go back to seeking orders.
    pub(crate) fn abandon_wait(&mut self) {
        self.processing = Task::ResumeMission;
    }

    /// Start a reassignment to `order`.
    pub(crate) fn begin_reassignment(&mut self, order: Task) {
        debug_assert!(order.is_assignable());
        self.pending = order;
        self.processing = Task::ChangeTask;
    }

    /// The reassignment delay elapsed; re-confirm the new order.
    pub(crate) fn finish_reassignment(&mut self, order: Task) {
        self.processing = Task::ResumeMission;
        self.pending = order;
    }

    /// Permanently commit the robot to one job family. Set exactly once,
    /// never reverted.
    pub(crate) fn specialize(&mut self) {
        debug_assert!(!self.specialized);
        self.specialized = true;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn robot(order: Task, specialized: bool) -> Robot {
        let mut fleet = SlotMap::<RobotId, ()>::with_key();
        let id = fleet.insert(());
        Robot::new(id, order, specialized)
    }

    #[test]
    fn new_robot_is_idle_with_queued_order() {
        let bot = robot(Task::MineOre, true);
        assert!(bot.is_idle());
        assert_eq!(bot.pending(), Task::MineOre);
        assert!(bot.is_specialized());
    }

    #[test]
    fn begin_and_finish_cycle() {
        let mut bot = robot(Task::MineCrystal, false);
        bot.begin(Task::MineCrystal);
        assert_eq!(bot.processing(), Task::MineCrystal);
        assert!(!bot.is_idle());

        bot.finish(Task::MineCrystal);
        assert!(bot.is_idle());
        assert_eq!(bot.pending(), Task::MineCrystal);
    }

    #[test]
    fn wait_and_abandon() {
        let mut bot = robot(Task::AssembleWidget, false);
        bot.begin_wait();
        assert_eq!(bot.processing(), Task::WaitingResources);
        bot.abandon_wait();
        assert!(bot.is_idle());
        // The queued task survives an abandonment.
        assert_eq!(bot.pending(), Task::AssembleWidget);
    }

    #[test]
    fn reassignment_cycle() {
        let mut bot = robot(Task::MineCrystal, false);
        bot.begin_reassignment(Task::RecruitRobot);
        assert_eq!(bot.processing(), Task::ChangeTask);
        assert_eq!(bot.pending(), Task::RecruitRobot);

        bot.finish_reassignment(Task::RecruitRobot);
        assert!(bot.is_idle());
        assert_eq!(bot.pending(), Task::RecruitRobot);
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut bot = robot(Task::SellWidgets, true);
        bot.begin(Task::SellWidgets);
        let snap = bot.snapshot();
        assert_eq!(snap.id, bot.id());
        assert_eq!(snap.processing, Task::SellWidgets);
        assert_eq!(snap.pending, Task::SellWidgets);
        assert!(snap.specialized);
    }
}
