//! Headless runner: drives a seeded simulation to its fleet goal and
//! prints the milestone events and the final inventory.
//!
//! Run with: `cargo run --package botworks-core --example headless`

use botworks_core::event::Event;
use botworks_core::sim::{RunOutcome, SimConfig};
use botworks_core::warehouse::Warehouse;

const TICK_BUDGET: u64 = 500_000_000;

fn main() {
    let config = SimConfig {
        robot_goal: 10,
        ticks_per_unit: 10,
        seed: 42,
    };
    println!(
        "=== botworks headless run: goal {} robots, seed {} ===",
        config.robot_goal, config.seed
    );

    let mut warehouse = Warehouse::new(config).expect("valid config");
    warehouse.subscribe(
        "console",
        Box::new(|event: &Event| match event {
            Event::GameStarted => println!("game started"),
            Event::RobotArrived { robot } => {
                println!("robot arrived: {:?} (pending {:?})", robot.id, robot.pending)
            }
            Event::SaleSucceeded { amount, .. } => println!("sold {amount} widgets"),
            Event::RecruitSucceeded { .. } => println!("recruited a new robot"),
            Event::MissionAccomplished => println!("mission accomplished"),
            _ => {}
        }),
    );

    warehouse.start();
    let outcome = warehouse.run_until(TICK_BUDGET);

    let inventory = warehouse.inventory();
    println!("\noutcome: {outcome:?} after {} ticks", warehouse.now());
    println!(
        "fleet {} | ore {} | crystal {} | widgets {} | credits {} (spent {}) | wasted ore {}",
        inventory.robots,
        inventory.ore,
        inventory.crystal,
        inventory.widgets,
        inventory.credits,
        inventory.credits_spent,
        inventory.wasted_ore
    );
    for robot in warehouse.fleet_snapshots() {
        println!(
            "  {:?}: processing {:?}, pending {:?}, specialized {}",
            robot.id, robot.processing, robot.pending, robot.specialized
        );
    }

    assert_eq!(outcome, RunOutcome::Accomplished, "run did not converge");
}
