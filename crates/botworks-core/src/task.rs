//! The order enum a robot can hold and the concrete work requests the
//! supervisor issues.

use crate::fixed::Fixed64;
use crate::rng::SimRng;

/// The unit of work a robot can be assigned.
///
/// `ResumeMission` is a sentinel meaning "idle, awaiting new orders" and
/// `WaitingResources` marks a blocked retry loop; neither is ever a valid
/// *pending* order -- they only appear as the processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Task {
    MineOre,
    MineCrystal,
    AssembleWidget,
    SellWidgets,
    RecruitRobot,
    ChangeTask,
    WaitingResources,
    ResumeMission,
}

impl Task {
    /// Simulated duration of one execution of this task, in time units.
    ///
    /// Ore mining takes a uniform draw in [0.5, 2.5) truncated to one
    /// decimal; recruiting completes in zero time (the try event fires as
    /// the next scheduled unit). The sentinels have no duration.
    pub fn duration_units(self, rng: &mut SimRng) -> Fixed64 {
        match self {
            Task::MineCrystal => Fixed64::from_num(1),
            Task::MineOre => {
                rng.uniform_tenths(Fixed64::from_num(0.5), Fixed64::from_num(2.5))
            }
            Task::AssembleWidget => Fixed64::from_num(2),
            Task::SellWidgets => Fixed64::from_num(10),
            Task::ChangeTask => Fixed64::from_num(5),
            Task::RecruitRobot => Fixed64::ZERO,
            Task::WaitingResources | Task::ResumeMission => Fixed64::ZERO,
        }
    }

    /// Whether this order may be held as a pending (queued) action.
    pub fn is_assignable(self) -> bool {
        !matches!(self, Task::WaitingResources | Task::ResumeMission)
    }
}

/// A concrete work request: a task plus the payload it runs with.
///
/// The supervisor decides these; the warehouse executes them. Requests are
/// re-scheduled verbatim while a resource-gated task waits on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRequest {
    MineOre,
    MineCrystal,
    Assemble,
    Sell { amount: u32 },
    Recruit { order: Task },
}

impl TaskRequest {
    /// The order enum value this request corresponds to.
    pub fn task(self) -> Task {
        match self {
            TaskRequest::MineOre => Task::MineOre,
            TaskRequest::MineCrystal => Task::MineCrystal,
            TaskRequest::Assemble => Task::AssembleWidget,
            TaskRequest::Sell { .. } => Task::SellWidgets,
            TaskRequest::Recruit { .. } => Task::RecruitRobot,
        }
    }

    /// Whether this request must pass a ledger affordability check before
    /// it starts processing.
    pub fn is_gated(self) -> bool {
        matches!(
            self,
            TaskRequest::Assemble | TaskRequest::Sell { .. } | TaskRequest::Recruit { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    #[test]
    fn fixed_durations() {
        let mut rng = SimRng::new(1);
        assert_eq!(Task::MineCrystal.duration_units(&mut rng), f64_to_fixed64(1.0));
        assert_eq!(Task::AssembleWidget.duration_units(&mut rng), f64_to_fixed64(2.0));
        assert_eq!(Task::SellWidgets.duration_units(&mut rng), f64_to_fixed64(10.0));
        assert_eq!(Task::ChangeTask.duration_units(&mut rng), f64_to_fixed64(5.0));
        assert_eq!(Task::RecruitRobot.duration_units(&mut rng), Fixed64::ZERO);
    }

    #[test]
    fn ore_duration_in_range() {
        let mut rng = SimRng::new(99);
        let min = f64_to_fixed64(0.5);
        let max = f64_to_fixed64(2.5);
        for _ in 0..500 {
            let d = Task::MineOre.duration_units(&mut rng);
            assert!(d >= min && d < max, "duration {d} out of range");
        }
    }

    #[test]
    fn sentinels_are_not_assignable() {
        assert!(!Task::ResumeMission.is_assignable());
        assert!(!Task::WaitingResources.is_assignable());
        assert!(Task::MineOre.is_assignable());
        assert!(Task::ChangeTask.is_assignable());
    }

    #[test]
    fn request_task_mapping() {
        assert_eq!(TaskRequest::MineOre.task(), Task::MineOre);
        assert_eq!(TaskRequest::Sell { amount: 5 }.task(), Task::SellWidgets);
        assert_eq!(
            TaskRequest::Recruit { order: Task::MineOre }.task(),
            Task::RecruitRobot
        );
    }

    #[test]
    fn gating() {
        assert!(TaskRequest::Assemble.is_gated());
        assert!(TaskRequest::Sell { amount: 1 }.is_gated());
        assert!(TaskRequest::Recruit { order: Task::MineOre }.is_gated());
        assert!(!TaskRequest::MineOre.is_gated());
        assert!(!TaskRequest::MineCrystal.is_gated());
    }
}
