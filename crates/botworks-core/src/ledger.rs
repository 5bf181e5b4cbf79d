//! The shared resource ledger: ore, crystal, widgets, and credits.
//!
//! The ledger is the single source of truth for resource state. Robots
//! never hold resource copies; they read availability through the
//! predicates and the warehouse applies mutations in response to "try"
//! events. Every mutation here is a pure state transition returning a
//! domain result; the warehouse layer turns results into success/failure
//! events.

use crate::error::TaskError;
use crate::fixed::Fixed64;
use crate::query::InventorySnapshot;
use crate::rng::SimRng;

/// Credits deducted for one recruit.
pub const RECRUIT_CREDITS_PRICE: u64 = 3;

/// Ore units consumed for one recruit.
pub const RECRUIT_ORE_PRICE: u32 = 6;

/// Assembly requires strictly more ore than this reserve.
pub const ASSEMBLY_ORE_RESERVE: u32 = 6;

/// Probability that one assembly attempt succeeds; otherwise the ore unit
/// breaks and is destroyed.
fn assembly_success_probability() -> Fixed64 {
    Fixed64::from_num(0.6)
}

/// Resource and bookkeeping state. All counts are non-negative by type;
/// the credit balance never goes below zero because every deduction is
/// predicate-guarded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ledger {
    ore: u32,
    crystal: u32,
    widgets: u32,
    credits: u64,
    credits_spent: u64,
    wasted_ore: u32,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// An empty ledger: no resources, no credits.
    pub fn new() -> Self {
        Self {
            ore: 0,
            crystal: 0,
            widgets: 0,
            credits: 0,
            credits_spent: 0,
            wasted_ore: 0,
        }
    }

    /// A ledger with preset stock levels, for tests and scenarios.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn stocked(ore: u32, crystal: u32, widgets: u32, credits: u64) -> Self {
        Self {
            ore,
            crystal,
            widgets,
            credits,
            credits_spent: 0,
            wasted_ore: 0,
        }
    }

    // -- Predicates (pure reads) --

    /// Whether one widget can be assembled: more than six ore in reserve
    /// and at least one crystal.
    pub fn can_assemble(&self) -> bool {
        self.ore > ASSEMBLY_ORE_RESERVE && self.crystal > 0
    }

    /// Whether `amount` widgets can be sold.
    pub fn can_sell(&self, amount: u32) -> bool {
        self.widgets >= amount
    }

    /// Whether a recruit is affordable: the credit price and the ore price
    /// must both be covered.
    pub fn can_recruit(&self) -> bool {
        self.credits >= RECRUIT_CREDITS_PRICE && self.ore >= RECRUIT_ORE_PRICE
    }

    // -- Mutations --

    /// Store one newly mined ore unit. Mining always succeeds.
    pub fn mine_ore(&mut self) {
        self.ore += 1;
    }

    /// Store one newly mined crystal unit. Mining always succeeds.
    pub fn mine_crystal(&mut self) {
        self.crystal += 1;
    }

    /// Attempt to assemble one widget.
    ///
    /// On the success draw, one ore and one crystal are consumed and one
    /// widget is produced. On the breakage draw, only the ore unit is
    /// destroyed and the waste counter incremented.
    pub fn assemble(&mut self, rng: &mut SimRng) -> Result<(), TaskError> {
        if !self.can_assemble() {
            return Err(TaskError::InsufficientResources);
        }
        if rng.chance(assembly_success_probability()) {
            self.ore -= 1;
            self.crystal -= 1;
            self.widgets += 1;
            Ok(())
        } else {
            self.ore -= 1;
            self.wasted_ore += 1;
            Err(TaskError::Breakage)
        }
    }

    /// Sell `amount` widgets for `amount` credits.
    pub fn sell(&mut self, amount: u32) -> Result<u32, TaskError> {
        if !self.can_sell(amount) {
            return Err(TaskError::InsufficientResources);
        }
        self.widgets -= amount;
        self.credits += u64::from(amount);
        Ok(amount)
    }

    /// Deduct the recruit prices. The caller instantiates the robot.
    pub fn pay_recruit(&mut self) -> Result<(), TaskError> {
        if !self.can_recruit() {
            return Err(TaskError::InsufficientResources);
        }
        self.credits -= RECRUIT_CREDITS_PRICE;
        self.credits_spent += RECRUIT_CREDITS_PRICE;
        self.ore -= RECRUIT_ORE_PRICE;
        Ok(())
    }

    // -- Accessors --

    pub fn ore(&self) -> u32 {
        self.ore
    }

    pub fn crystal(&self) -> u32 {
        self.crystal
    }

    pub fn widgets(&self) -> u32 {
        self.widgets
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn credits_spent(&self) -> u64 {
        self.credits_spent
    }

    pub fn wasted_ore(&self) -> u32 {
        self.wasted_ore
    }

    /// Owned snapshot of the inventory, combined with the fleet size the
    /// warehouse tracks.
    pub fn snapshot(&self, robots: u32) -> InventorySnapshot {
        InventorySnapshot {
            robots,
            ore: self.ore,
            crystal: self.crystal,
            widgets: self.widgets,
            credits: self.credits,
            credits_spent: self.credits_spent,
            wasted_ore: self.wasted_ore,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
