//! Rendezvous Barrier
//!
//! A reusable barrier for a fixed number of participants per round, built on
//! one mutex and one condition variable. The participant that completes a
//! round resets the arrival count, advances the round counter and wakes all
//! waiters inside the same critical section. Waiters remember the round they
//! entered and sleep until it changes, so spurious wakeups and early arrivals
//! for the next round cannot release them.
//!
//! Unlike `std::sync::Barrier`, a barrier can be cancelled: participants that
//! would otherwise wait forever for a peer that failed to arrive return
//! [`BarrierCancelled`] instead.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Returned by [`RendezvousBarrier::wait`] once a round is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    round: u64,
}

impl BarrierWaitResult {
    /// `true` for exactly one participant per round: the one whose arrival
    /// completed it
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Zero-based round this participant was released from
    pub fn round(&self) -> u64 {
        self.round
    }
}

/// The barrier was cancelled before the caller's round was released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("barrier cancelled before release")]
pub struct BarrierCancelled;

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    round: u64,
    cancelled: bool,
}

/// Reusable rendezvous point for `capacity` participants
#[derive(Debug)]
pub struct RendezvousBarrier {
    capacity: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl RendezvousBarrier {
    /// Create a barrier for exactly `capacity` participants per round.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "barrier capacity must be at least 1");
        Self {
            capacity,
            state: Mutex::new(BarrierState {
                arrived: 0,
                round: 0,
                cancelled: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Participants per round
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Block until `capacity` participants have called `wait` in this round.
    ///
    /// Returns `Err(BarrierCancelled)` if the barrier is, or becomes,
    /// cancelled before this round is released. Cancellation is sticky:
    /// every later call fails immediately.
    pub fn wait(&self) -> Result<BarrierWaitResult, BarrierCancelled> {
        let mut state = self.lock();
        if state.cancelled {
            return Err(BarrierCancelled);
        }

        let entry_round = state.round;
        state.arrived += 1;

        if state.arrived == self.capacity {
            state.arrived = 0;
            state.round += 1;
            self.released.notify_all();
            return Ok(BarrierWaitResult {
                leader: true,
                round: entry_round,
            });
        }

        while state.round == entry_round {
            if state.cancelled {
                state.arrived -= 1;
                return Err(BarrierCancelled);
            }
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        Ok(BarrierWaitResult {
            leader: false,
            round: entry_round,
        })
    }

    /// Cancel the barrier and wake every waiter
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.cancelled = true;
        self.released.notify_all();
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Number of rounds released so far
    pub fn rounds_completed(&self) -> u64 {
        self.lock().round
    }

    // Counters are only mutated together under the lock, so a poisoned guard
    // still holds a consistent state.
    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
