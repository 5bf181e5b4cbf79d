//! The simulation root: composes the ledger, event bus, scheduler, RNG,
//! and robot fleet, and orchestrates startup and goal-completion shutdown.
//!
//! # Control flow
//!
//! A robot finishes a task in a scheduled continuation, which publishes the
//! task's try/success event and a waiting-for-orders event. Delivery is
//! itself a scheduled continuation: the ledger role applies the economic
//! effect and publishes an inventory snapshot, and the supervisor role
//! answers the waiting robot with a [`Directive`] that the warehouse
//! applies. Everything runs on one logical thread; the only suspension
//! points are scheduler wakeups.
//!
//! The warehouse instance is explicitly constructed and explicitly owned by
//! the host. There is no ambient global state.

use slotmap::SlotMap;

use crate::error::ConfigError;
use crate::event::{Event, EventBus, ObserverFn, Role, RosterEntry};
use crate::fixed::Ticks;
use crate::id::RobotId;
use crate::ledger::Ledger;
use crate::query::{InventorySnapshot, RobotSnapshot};
use crate::rng::SimRng;
use crate::robot::{MAX_RESOURCE_RETRIES, Robot};
use crate::scheduler::{Scheduler, Wakeup};
use crate::sim::{RunOutcome, SimConfig};
use crate::supervisor::{self, Directive};
use crate::task::{Task, TaskRequest};

/// Listener id of the ledger role subscription.
const LEDGER_LISTENER: &str = "warehouse-ledger";

/// Listener id of the supervisor role subscription.
const SUPERVISOR_LISTENER: &str = "fleet-supervisor";

/// A blocked resource-gated request re-checks affordability on the next
/// scheduling tick.
const RETRY_DELAY_TICKS: Ticks = 1;

/// The simulation root.
pub struct Warehouse {
    config: SimConfig,
    ledger: Ledger,
    fleet: SlotMap<RobotId, Robot>,
    bus: EventBus,
    scheduler: Scheduler,
    rng: SimRng,
    started: bool,
    accomplished: bool,
    terminal_delivered: bool,
}

impl Warehouse {
    /// Build a warehouse with two initial robots: a specialized ore miner
    /// and the generalist crystal miner that will bootstrap recruiting.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = SimRng::new(config.seed);
        let mut warehouse = Self {
            config,
            ledger: Ledger::new(),
            fleet: SlotMap::with_key(),
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            rng,
            started: false,
            accomplished: false,
            terminal_delivered: false,
        };
        warehouse.bus.attach_role(LEDGER_LISTENER, Role::Ledger);
        warehouse.bus.attach_role(SUPERVISOR_LISTENER, Role::Supervisor);
        warehouse.spawn_robot(Task::MineOre, true);
        warehouse.spawn_robot(Task::MineCrystal, false);
        Ok(warehouse)
    }

    // -- External interface --

    /// Register an observer callback under `listener_id`. The sole API
    /// surface for watching simulation progress.
    pub fn subscribe(&mut self, listener_id: impl Into<String>, callback: ObserverFn) {
        self.bus.subscribe(listener_id, callback);
    }

    /// Remove an observer registration. No-op for unknown ids.
    pub fn unsubscribe(&mut self, listener_id: &str) {
        self.bus.unsubscribe(listener_id);
    }

    /// Begin the simulation. Emits the game-started and arrival events and
    /// sends every robot looking for orders -- unless the initial fleet
    /// already meets the goal, in which case the mission finishes
    /// immediately and no robot ever executes a task. Subsequent calls are
    /// no-ops.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.publish(Event::GameStarted);
        let arrivals: Vec<RobotSnapshot> = self.fleet.values().map(Robot::snapshot).collect();
        for robot in arrivals {
            self.publish(Event::RobotArrived { robot });
        }
        if self.fleet.len() as u32 >= self.config.robot_goal {
            self.finish_mission();
            return;
        }
        let ids: Vec<RobotId> = self.fleet.keys().collect();
        for robot in ids {
            self.publish(Event::WaitingOrders { robot });
        }
    }

    /// Execute the next scheduled continuation, advancing the simulated
    /// clock to its due tick. Returns false when no work is pending.
    pub fn step(&mut self) -> bool {
        let Some(wakeup) = self.scheduler.pop() else {
            return false;
        };
        match wakeup {
            Wakeup::Deliver { event } => self.deliver(event),
            Wakeup::TaskFinished { robot, request } => self.finish_task(robot, request),
            Wakeup::Retry {
                robot,
                request,
                attempts,
            } => self.issue(robot, request, attempts),
            Wakeup::ReassignmentDone { robot, order } => {
                self.finish_reassignment(robot, order);
            }
        }
        true
    }

    /// Run until the mission-accomplished event has been delivered, the
    /// queue drains, or the next wakeup lies beyond `deadline`. Always
    /// bounded: blocked specialists retry forever, so callers must budget.
    pub fn run_until(&mut self, deadline: Ticks) -> RunOutcome {
        loop {
            if self.accomplished && self.terminal_delivered {
                return RunOutcome::Accomplished;
            }
            let Some(due) = self.scheduler.next_due() else {
                return RunOutcome::Idle;
            };
            if due > deadline {
                return RunOutcome::DeadlineReached;
            }
            self.step();
        }
    }

    // -- Observation accessors --

    /// Current simulated time in ticks.
    pub fn now(&self) -> Ticks {
        self.scheduler.now()
    }

    /// Whether the fleet has reached its goal.
    pub fn is_accomplished(&self) -> bool {
        self.accomplished
    }

    /// Owned snapshot of the current inventory.
    pub fn inventory(&self) -> InventorySnapshot {
        self.ledger.snapshot(self.fleet.len() as u32)
    }

    /// Current fleet size.
    pub fn fleet_size(&self) -> u32 {
        self.fleet.len() as u32
    }

    /// Owned snapshots of every robot, in arrival order.
    pub fn fleet_snapshots(&self) -> Vec<RobotSnapshot> {
        self.fleet.values().map(Robot::snapshot).collect()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// How many observer callbacks have panicked during delivery.
    pub fn observer_panics(&self) -> u64 {
        self.bus.observer_panics()
    }

    /// Number of pending scheduler wakeups.
    pub fn pending_work(&self) -> usize {
        self.scheduler.len()
    }

    // -- Event plumbing --

    /// Publish an event: schedule one delivery unit at the current tick.
    /// The publisher never observes its own publish synchronously.
    fn publish(&mut self, event: Event) {
        self.scheduler.schedule_in(0, Wakeup::Deliver { event });
    }

    /// Deliver one event to every listener registered at delivery time, as
    /// a single unit. Registration is re-checked before each call so a
    /// handler that unsubscribes mid-batch is honored.
    fn deliver(&mut self, event: Event) {
        for (id, entry) in self.bus.roster() {
            if !self.bus.is_subscribed(&id) {
                continue;
            }
            match entry {
                RosterEntry::Role(Role::Ledger) => self.ledger_on_event(&event),
                RosterEntry::Role(Role::Supervisor) => self.supervisor_on_event(&event),
                RosterEntry::Observer => self.bus.notify_observer(&id, &event),
            }
        }
        if event == Event::MissionAccomplished {
            self.terminal_delivered = true;
        }
    }

    fn report_inventory(&mut self) {
        let inventory = self.inventory();
        self.publish(Event::InventoryReport { inventory });
    }

    // -- Ledger role: apply economic effects of try events --

    fn ledger_on_event(&mut self, event: &Event) {
        match event {
            Event::RobotStateAsked { robot } => {
                // Pass-through so external observers can track robot state
                // without the ledger knowing about them.
                self.publish(Event::RobotStateSent {
                    robot: robot.clone(),
                });
            }
            Event::OreMiningSucceeded { .. } => {
                self.ledger.mine_ore();
                self.report_inventory();
            }
            Event::CrystalMiningSucceeded { .. } => {
                self.ledger.mine_crystal();
                self.report_inventory();
            }
            Event::AssemblyTried { robot } => {
                let robot = *robot;
                match self.ledger.assemble(&mut self.rng) {
                    Ok(()) => self.publish(Event::AssemblySucceeded { robot }),
                    Err(error) => self.publish(Event::AssemblyFailed { robot, error }),
                }
                self.report_inventory();
            }
            Event::SaleTried { robot, amount } => {
                let robot = *robot;
                match self.ledger.sell(*amount) {
                    Ok(amount) => self.publish(Event::SaleSucceeded { robot, amount }),
                    Err(error) => self.publish(Event::SaleFailed { robot, error }),
                }
                self.report_inventory();
            }
            Event::RecruitTried { robot, order } => {
                self.recruit(*robot, *order);
                self.report_inventory();
            }
            _ => {}
        }
    }

    fn recruit(&mut self, buyer: RobotId, order: Task) {
        match self.ledger.pay_recruit() {
            Err(error) => self.publish(Event::RecruitFailed {
                robot: buyer,
                error,
            }),
            Ok(()) => {
                let rookie = self.spawn_robot(order, true);
                self.publish(Event::RecruitSucceeded { robot: buyer });
                self.publish(Event::RobotArrived {
                    robot: self.fleet[rookie].snapshot(),
                });
                // Start the rookie: it asks for orders immediately.
                self.publish(Event::WaitingOrders { robot: rookie });
                if self.fleet.len() as u32 >= self.config.robot_goal {
                    self.finish_mission();
                }
            }
        }
    }

    /// Terminal state: report the final inventory, announce the
    /// accomplished mission, and stop all ledger-side event processing.
    fn finish_mission(&mut self) {
        self.report_inventory();
        self.publish(Event::MissionAccomplished);
        self.bus.unsubscribe(LEDGER_LISTENER);
        self.accomplished = true;
    }

    // -- Supervisor role: answer waiting robots --

    fn supervisor_on_event(&mut self, event: &Event) {
        match event {
            Event::WaitingOrders { robot } => self.assign(*robot),
            Event::MissionAccomplished => self.bus.unsubscribe(SUPERVISOR_LISTENER),
            _ => {}
        }
    }

    fn assign(&mut self, id: RobotId) {
        // Tolerate an unknown robot as a silent no-op.
        let Some(robot) = self.fleet.get(id) else {
            return;
        };
        match supervisor::next_orders(&self.fleet, &self.ledger, robot) {
            Directive::Stand => {}
            Directive::Issue(request) => self.issue(id, request, 0),
            Directive::Reassign(order) => self.reassign(id, order),
            Directive::SpecializeAndReassign => {
                self.fleet[id].specialize();
                self.reassign(id, Task::RecruitRobot);
            }
        }
    }

    // -- Task orchestration --

    /// Execute a work request, passing resource-gated requests through the
    /// affordability check first. A blocked request busy-waits on the
    /// scheduler with a carried retry counter; past the retry limit a
    /// non-specialized robot abandons it and asks for new orders instead.
    fn issue(&mut self, id: RobotId, request: TaskRequest, attempts: u32) {
        let Some(robot) = self.fleet.get(id) else {
            return;
        };
        if attempts > MAX_RESOURCE_RETRIES && !robot.is_specialized() {
            self.fleet[id].abandon_wait();
            self.publish(Event::WaitingOrders { robot: id });
            return;
        }
        let affordable = match request {
            TaskRequest::Assemble => self.ledger.can_assemble(),
            TaskRequest::Sell { amount } => self.ledger.can_sell(amount),
            TaskRequest::Recruit { .. } => self.ledger.can_recruit(),
            TaskRequest::MineOre | TaskRequest::MineCrystal => true,
        };
        if !affordable {
            self.fleet[id].begin_wait();
            self.scheduler.schedule_in(
                RETRY_DELAY_TICKS,
                Wakeup::Retry {
                    robot: id,
                    request,
                    attempts: attempts + 1,
                },
            );
            return;
        }
        self.begin_task(id, request);
    }

    fn begin_task(&mut self, id: RobotId, request: TaskRequest) {
        let task = request.task();
        let snapshot = {
            let robot = &mut self.fleet[id];
            robot.begin(task);
            robot.snapshot()
        };
        self.publish(start_event(request, id));
        self.publish(Event::RobotStateAsked { robot: snapshot });
        let duration = task.duration_units(&mut self.rng);
        let delay = self.config.units_to_ticks(duration);
        self.scheduler
            .schedule_in(delay, Wakeup::TaskFinished { robot: id, request });
    }

    fn finish_task(&mut self, id: RobotId, request: TaskRequest) {
        let Some(robot) = self.fleet.get_mut(id) else {
            return;
        };
        robot.finish(request.task());
        self.publish(try_event(request, id));
        self.publish(Event::WaitingOrders { robot: id });
    }

    fn reassign(&mut self, id: RobotId, order: Task) {
        let snapshot = {
            let robot = &mut self.fleet[id];
            robot.begin_reassignment(order);
            robot.snapshot()
        };
        self.publish(Event::OrderChangeStarted {
            robot: id,
            new_order: order,
        });
        self.publish(Event::RobotStateAsked { robot: snapshot });
        let duration = Task::ChangeTask.duration_units(&mut self.rng);
        let delay = self.config.units_to_ticks(duration);
        self.scheduler
            .schedule_in(delay, Wakeup::ReassignmentDone { robot: id, order });
    }

    fn finish_reassignment(&mut self, id: RobotId, order: Task) {
        let Some(robot) = self.fleet.get_mut(id) else {
            return;
        };
        robot.finish_reassignment(order);
        self.publish(Event::OrderChangeSucceeded { robot: id });
        self.publish(Event::WaitingOrders { robot: id });
    }

    fn spawn_robot(&mut self, order: Task, specialized: bool) -> RobotId {
        self.fleet
            .insert_with_key(|id| Robot::new(id, order, specialized))
    }
}

/// The start event announcing that a robot began processing.
fn start_event(request: TaskRequest, robot: RobotId) -> Event {
    match request {
        TaskRequest::MineOre => Event::OreMiningStarted { robot },
        TaskRequest::MineCrystal => Event::CrystalMiningStarted { robot },
        TaskRequest::Assemble => Event::AssemblyStarted { robot },
        TaskRequest::Sell { .. } => Event::SaleStarted { robot },
        TaskRequest::Recruit { .. } => Event::RecruitStarted { robot },
    }
}

/// The completion report: mining succeeds outright, everything else is a
/// try that the ledger resolves into success or failure.
fn try_event(request: TaskRequest, robot: RobotId) -> Event {
    match request {
        TaskRequest::MineOre => Event::OreMiningSucceeded { robot },
        TaskRequest::MineCrystal => Event::CrystalMiningSucceeded { robot },
        TaskRequest::Assemble => Event::AssemblyTried { robot },
        TaskRequest::Sell { amount } => Event::SaleTried { robot, amount },
        TaskRequest::Recruit { order } => Event::RecruitTried { robot, order },
    }
}

// -- Test scaffolding --

#[cfg(any(test, feature = "test-utils"))]
impl Warehouse {
    /// Replace the stock levels, for scenario setup.
    pub fn stock(&mut self, ore: u32, crystal: u32, widgets: u32, credits: u64) {
        self.ledger = Ledger::stocked(ore, crystal, widgets, credits);
    }

    /// The id of the (sole) generalist robot.
    pub fn generalist_id(&self) -> Option<RobotId> {
        self.fleet
            .iter()
            .find(|(_, robot)| !robot.is_specialized())
            .map(|(id, _)| id)
    }

    /// The ids of all specialized robots.
    pub fn specialist_ids(&self) -> Vec<RobotId> {
        self.fleet
            .iter()
            .filter(|(_, robot)| robot.is_specialized())
            .map(|(id, _)| id)
            .collect()
    }

    /// Snapshot one robot, if it exists.
    pub fn robot_snapshot(&self, id: RobotId) -> Option<RobotSnapshot> {
        self.fleet.get(id).map(Robot::snapshot)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
