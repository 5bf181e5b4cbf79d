//! The fleet supervisor: recruiting and task-assignment policy.
//!
//! The supervisor is a pure policy engine. Whenever a robot reports that it
//! is waiting for orders, [`next_orders`] inspects the fleet composition
//! and ledger affordability and returns a [`Directive`]; the warehouse
//! applies it. The supervisor never mutates a robot itself, so every
//! decision is an inspectable value and the policy is trivially testable.
//!
//! The strategy has two phases keyed on fleet size. Phase One (small
//! fleet, exactly one generalist) provisions every job with at least one
//! specialist, steering the generalist toward recruiting whenever it is
//! affordable. Phase Two (steady state, no generalists left) keeps
//! recruiting specialists, choosing each recruit's job to balance the
//! committed-robot ratios along the production chain.

use slotmap::SlotMap;

use crate::fixed::Fixed64;
use crate::id::RobotId;
use crate::ledger::Ledger;
use crate::robot::Robot;
use crate::task::{Task, TaskRequest};

/// Widgets sold per sale trip.
pub const SELL_BATCH: u32 = 5;

/// Fleet sizes up to this threshold use the Phase One strategy.
pub const PHASE_ONE_MAX_FLEET: usize = 5;

/// What the warehouse should do with a robot that asked for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Dispatch this work request now.
    Issue(TaskRequest),
    /// Reassign the robot to a new order (takes the order-change delay).
    Reassign(Task),
    /// Convert the generalist: mark it specialized, then reassign it to
    /// recruiting.
    SpecializeAndReassign,
    /// Leave the robot alone.
    Stand,
}

/// Decide the next action for `robot`.
pub fn next_orders(
    fleet: &SlotMap<RobotId, Robot>,
    ledger: &Ledger,
    robot: &Robot,
) -> Directive {
    if fleet.len() <= PHASE_ONE_MAX_FLEET {
        phase_one(fleet, ledger, robot)
    } else {
        phase_two(fleet, robot)
    }
}

/// Phase One: only the generalist changes jobs, in fixed priority order --
/// recruit when affordable, else sell a batch when one is ready, else
/// assemble when material allows. When no change applies (or for
/// specialists) the robot resumes its queued task.
fn phase_one(fleet: &SlotMap<RobotId, Robot>, ledger: &Ledger, robot: &Robot) -> Directive {
    if !robot.is_idle() {
        return Directive::Stand;
    }

    let reassignment = if robot.is_specialized() {
        None
    } else if ledger.can_recruit() {
        (robot.pending() != Task::RecruitRobot).then_some(Task::RecruitRobot)
    } else if ledger.can_sell(SELL_BATCH) {
        (robot.pending() != Task::SellWidgets).then_some(Task::SellWidgets)
    } else if ledger.can_assemble() {
        (robot.pending() != Task::AssembleWidget).then_some(Task::AssembleWidget)
    } else {
        None
    };

    match reassignment {
        Some(order) => Directive::Reassign(order),
        None => resume(fleet, robot),
    }
}

/// Phase Two: recruiters recruit by ratio, the arriving generalist is
/// converted into a recruiter, and everyone else resumes their specialty.
fn phase_two(fleet: &SlotMap<RobotId, Robot>, robot: &Robot) -> Directive {
    if !robot.is_idle() {
        return Directive::Stand;
    }
    if robot.pending() == Task::RecruitRobot {
        return Directive::Issue(TaskRequest::Recruit {
            order: phase_two_target(fleet),
        });
    }
    if !robot.is_specialized() {
        return Directive::SpecializeAndReassign;
    }
    resume(fleet, robot)
}

/// Resume the robot's queued task. A queued recruit uses the Phase One
/// staffing-gap target; `ChangeTask` is not resumable.
fn resume(fleet: &SlotMap<RobotId, Robot>, robot: &Robot) -> Directive {
    match robot.pending() {
        Task::AssembleWidget => Directive::Issue(TaskRequest::Assemble),
        Task::MineOre => Directive::Issue(TaskRequest::MineOre),
        Task::MineCrystal => Directive::Issue(TaskRequest::MineCrystal),
        Task::SellWidgets => Directive::Issue(TaskRequest::Sell { amount: SELL_BATCH }),
        Task::RecruitRobot => Directive::Issue(TaskRequest::Recruit {
            order: phase_one_target(fleet),
        }),
        Task::ChangeTask | Task::WaitingResources | Task::ResumeMission => Directive::Stand,
    }
}

/// Phase One recruit target: the first of {crystal mining, ore mining,
/// assembling} with no specialized robot committed to it; selling once all
/// three are covered.
pub fn phase_one_target(fleet: &SlotMap<RobotId, Robot>) -> Task {
    for job in [Task::MineCrystal, Task::MineOre, Task::AssembleWidget] {
        if !has_committed_specialist(fleet, job) {
            return job;
        }
    }
    Task::SellWidgets
}

/// Phase Two recruit target: balance the committed-robot ratios along the
/// chain, in priority order. Each check compares in multiplied-out form
/// (`count(first) < threshold * count(second)`), so a job with zero robots
/// in the denominator makes the ratio infinite and the check falls through.
pub fn phase_two_target(fleet: &SlotMap<RobotId, Robot>) -> Task {
    // Ore miners per assembler below 2.0: recruit an ore miner.
    if ratio_below(fleet, Task::MineOre, Task::AssembleWidget, Fixed64::from_num(2.0)) {
        return Task::MineOre;
    }
    // Crystal miners per assembler below 0.7: recruit a crystal miner.
    if ratio_below(
        fleet,
        Task::MineCrystal,
        Task::AssembleWidget,
        Fixed64::from_num(0.7),
    ) {
        return Task::MineCrystal;
    }
    // Assemblers per seller below 2.0: recruit an assembler.
    if ratio_below(
        fleet,
        Task::AssembleWidget,
        Task::SellWidgets,
        Fixed64::from_num(2.0),
    ) {
        return Task::AssembleWidget;
    }
    Task::SellWidgets
}

/// Robots currently committed (processing or pending) to `job`.
fn committed_count(fleet: &SlotMap<RobotId, Robot>, job: Task) -> u32 {
    fleet
        .values()
        .filter(|robot| robot.processing() == job || robot.pending() == job)
        .count() as u32
}

/// Whether any specialized robot is committed to `job`.
fn has_committed_specialist(fleet: &SlotMap<RobotId, Robot>, job: Task) -> bool {
    fleet.values().any(|robot| {
        robot.is_specialized() && (robot.processing() == job || robot.pending() == job)
    })
}

/// `committed(first) / committed(second) < threshold`, evaluated without
/// dividing so a zero denominator reads as an infinite ratio (false).
fn ratio_below(
    fleet: &SlotMap<RobotId, Robot>,
    first: Task,
    second: Task,
    threshold: Fixed64,
) -> bool {
    let first = Fixed64::from_num(committed_count(fleet, first));
    let second = Fixed64::from_num(committed_count(fleet, second));
    first < threshold * second
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a fleet from (pending order, specialized) pairs. Robots are
    /// idle unless marked otherwise afterwards.
    fn fleet_of(specs: &[(Task, bool)]) -> SlotMap<RobotId, Robot> {
        let mut fleet = SlotMap::with_key();
        for &(order, specialized) in specs {
            fleet.insert_with_key(|id| Robot::new(id, order, specialized));
        }
        fleet
    }

    fn first(fleet: &SlotMap<RobotId, Robot>) -> &Robot {
        fleet.values().next().unwrap()
    }

    #[test]
    fn busy_robot_is_left_alone() {
        let mut fleet = fleet_of(&[(Task::MineOre, false)]);
        let id = fleet.keys().next().unwrap();
        fleet[id].begin(Task::MineOre);
        let ledger = Ledger::stocked(0, 0, 0, 0);
        assert_eq!(
            next_orders(&fleet, &ledger, &fleet[id]),
            Directive::Stand
        );
    }

    #[test]
    fn phase_one_generalist_prefers_recruiting() {
        let fleet = fleet_of(&[(Task::MineCrystal, false), (Task::MineOre, true)]);
        let ledger = Ledger::stocked(10, 0, 0, 5);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Reassign(Task::RecruitRobot)
        );
    }

    #[test]
    fn phase_one_generalist_already_recruiting_resumes() {
        let fleet = fleet_of(&[(Task::RecruitRobot, false), (Task::MineOre, true)]);
        let ledger = Ledger::stocked(10, 0, 0, 5);
        // Recruit affordable and already queued: resume it. The target is
        // the staffing gap (no crystal-mining specialist here).
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Issue(TaskRequest::Recruit {
                order: Task::MineCrystal
            })
        );
    }

    #[test]
    fn phase_one_generalist_sells_when_batch_ready() {
        let fleet = fleet_of(&[(Task::MineCrystal, false), (Task::MineOre, true)]);
        let ledger = Ledger::stocked(0, 0, 5, 0);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Reassign(Task::SellWidgets)
        );
    }

    #[test]
    fn phase_one_generalist_assembles_when_material_allows() {
        let fleet = fleet_of(&[(Task::MineCrystal, false), (Task::MineOre, true)]);
        let ledger = Ledger::stocked(7, 1, 0, 0);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Reassign(Task::AssembleWidget)
        );
    }

    #[test]
    fn phase_one_nothing_affordable_resumes_mining() {
        let fleet = fleet_of(&[(Task::MineCrystal, false), (Task::MineOre, true)]);
        let ledger = Ledger::stocked(0, 0, 0, 0);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Issue(TaskRequest::MineCrystal)
        );
    }

    #[test]
    fn phase_one_specialist_always_resumes() {
        let fleet = fleet_of(&[(Task::MineOre, true), (Task::MineCrystal, false)]);
        // Everything affordable, but a specialist never changes jobs.
        let ledger = Ledger::stocked(50, 10, 10, 50);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Issue(TaskRequest::MineOre)
        );
    }

    #[test]
    fn phase_one_target_fills_gaps_in_order() {
        // Specialized ore miner and assembler present, no crystal miner:
        // the gap check assigns crystal mining first.
        let fleet = fleet_of(&[
            (Task::MineOre, true),
            (Task::AssembleWidget, true),
            (Task::MineCrystal, false),
        ]);
        assert_eq!(phase_one_target(&fleet), Task::MineCrystal);

        // The generalist committed to crystal mining does not count; only
        // specialists cover a job.
        let fleet = fleet_of(&[(Task::MineCrystal, false), (Task::MineOre, true)]);
        assert_eq!(phase_one_target(&fleet), Task::MineCrystal);

        // All three covered by specialists: default to selling.
        let fleet = fleet_of(&[
            (Task::MineCrystal, true),
            (Task::MineOre, true),
            (Task::AssembleWidget, true),
        ]);
        assert_eq!(phase_one_target(&fleet), Task::SellWidgets);
    }

    #[test]
    fn phase_two_recruiter_recruits_by_ratio() {
        let fleet = fleet_of(&[
            (Task::RecruitRobot, true),
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineCrystal, true),
            (Task::AssembleWidget, true),
            (Task::SellWidgets, true),
        ]);
        let ledger = Ledger::stocked(0, 0, 0, 0);
        // 2 ore miners / 1 assembler = 2.0, not below 2.0; 1 crystal miner
        // / 1 assembler = 1.0, not below 0.7; 1 assembler / 1 seller = 1.0
        // < 2.0: recruit an assembler.
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Issue(TaskRequest::Recruit {
                order: Task::AssembleWidget
            })
        );
    }

    #[test]
    fn phase_two_zero_denominator_falls_through() {
        // No assemblers at all: both miner ratios are infinite and skip;
        // no sellers either, so the assembler ratio is also infinite and
        // the target falls through to selling.
        let fleet = fleet_of(&[
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineOre, true),
        ]);
        assert_eq!(phase_two_target(&fleet), Task::SellWidgets);
    }

    #[test]
    fn phase_two_ratio_priority_order() {
        // One assembler, no ore miners: ore ratio 0 < 2.0 wins first.
        let fleet = fleet_of(&[
            (Task::AssembleWidget, true),
            (Task::SellWidgets, true),
            (Task::SellWidgets, true),
            (Task::MineCrystal, true),
            (Task::MineCrystal, true),
            (Task::MineCrystal, true),
        ]);
        assert_eq!(phase_two_target(&fleet), Task::MineOre);
    }

    #[test]
    fn phase_two_converts_arriving_generalist() {
        let fleet = fleet_of(&[
            (Task::MineCrystal, false),
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineCrystal, true),
            (Task::AssembleWidget, true),
            (Task::SellWidgets, true),
        ]);
        let ledger = Ledger::stocked(0, 0, 0, 0);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::SpecializeAndReassign
        );
    }

    #[test]
    fn phase_two_specialist_resumes() {
        let fleet = fleet_of(&[
            (Task::SellWidgets, true),
            (Task::MineOre, true),
            (Task::MineOre, true),
            (Task::MineCrystal, true),
            (Task::AssembleWidget, true),
            (Task::AssembleWidget, true),
        ]);
        let ledger = Ledger::stocked(0, 0, 0, 0);
        assert_eq!(
            next_orders(&fleet, &ledger, first(&fleet)),
            Directive::Issue(TaskRequest::Sell { amount: SELL_BATCH })
        );
    }

    #[test]
    fn committed_counts_processing_and_pending() {
        let mut fleet = fleet_of(&[(Task::MineOre, true), (Task::MineCrystal, true)]);
        let id = fleet.keys().next().unwrap();
        // Processing ore while queued for ore counts once per robot.
        fleet[id].begin(Task::MineOre);
        assert_eq!(committed_count(&fleet, Task::MineOre), 1);
        assert_eq!(committed_count(&fleet, Task::MineCrystal), 1);
    }
}
