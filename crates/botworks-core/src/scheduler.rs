//! Cooperative timer queue for deferred continuations.
//!
//! All simulated work -- task completion, resource-retry wakeups, order
//! changes, and event delivery itself -- is a [`Wakeup`] scheduled at an
//! absolute tick. The queue is a binary heap ordered by `(due, seq)`, so
//! same-tick continuations run in schedule order and a run is fully
//! deterministic. There is no cancellation: once scheduled, a wakeup always
//! fires; components change their own state in a later continuation
//! instead of revoking an earlier one.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::event::Event;
use crate::fixed::Ticks;
use crate::id::RobotId;
use crate::task::{Task, TaskRequest};

// ---------------------------------------------------------------------------
// Wakeup
// ---------------------------------------------------------------------------

/// A deferred continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    /// Deliver one published event to every registered listener, as a unit.
    Deliver { event: Event },

    /// A robot's task duration has elapsed; report the attempt and ask for
    /// new orders.
    TaskFinished { robot: RobotId, request: TaskRequest },

    /// Re-attempt a resource-gated request on the next scheduling tick,
    /// carrying the retry counter.
    Retry {
        robot: RobotId,
        request: TaskRequest,
        attempts: u32,
    },

    /// A robot's order change has completed.
    ReassignmentDone { robot: RobotId, order: Task },
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Entry {
    due: Ticks,
    seq: u64,
    wakeup: Wakeup,
}

// Heap order ignores the payload: `seq` is unique, so `(due, seq)` is a
// total order over entries.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.seq) == (other.due, other.seq)
    }
}

impl Eq for Entry {}

/// The single logical thread's timer queue.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    now: Ticks,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current simulated time.
    pub fn now(&self) -> Ticks {
        self.now
    }

    /// Schedule `wakeup` to fire `delay` ticks from now. A zero delay fires
    /// at the current tick, after every continuation already scheduled.
    pub fn schedule_in(&mut self, delay: Ticks, wakeup: Wakeup) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due: self.now.saturating_add(delay),
            seq,
            wakeup,
        }));
    }

    /// The due tick of the next pending wakeup, if any.
    pub fn next_due(&self) -> Option<Ticks> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pop the next wakeup and advance the clock to its due tick.
    pub fn pop(&mut self) -> Option<Wakeup> {
        let Reverse(entry) = self.queue.pop()?;
        self.now = entry.due;
        Some(entry.wakeup)
    }

    /// Number of pending wakeups.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
