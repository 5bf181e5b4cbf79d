//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these
//! helpers are available in unit tests, integration tests, and benchmarks
//! (via the `test-utils` feature).

use std::cell::RefCell;
use std::rc::Rc;

use crate::event::Event;
use crate::fixed::Fixed64;
use crate::sim::SimConfig;
use crate::warehouse::Warehouse;

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// A config with a fixed seed and default pacing, so scenario tests are
/// reproducible.
pub fn test_config(robot_goal: u32) -> SimConfig {
    SimConfig {
        robot_goal,
        ticks_per_unit: 10,
        seed: 42,
    }
}

/// A fresh warehouse with the given goal and the fixed test seed.
pub fn test_warehouse(robot_goal: u32) -> Warehouse {
    Warehouse::new(test_config(robot_goal)).expect("valid test config")
}

/// Subscribe a recording observer and return the shared event log.
pub fn record_events(warehouse: &mut Warehouse, listener_id: &str) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    warehouse.subscribe(
        listener_id,
        Box::new(move |event: &Event| sink.borrow_mut().push(event.clone())),
    );
    log
}
