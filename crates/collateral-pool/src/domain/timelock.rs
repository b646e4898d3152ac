//! # Timelock Queue
//!
//! Per-holder queue of freshly minted shares that may not leave the pool yet.
//!
//! Unlock times are non-decreasing from front to back, so expired entries
//! always form a prefix of the queue. Cleanup pops from the front and does
//! work proportional to the entries it removes.

use super::value_objects::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Shares minted by one entry, locked until `unlock_time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockEntry {
    /// Locked shares.
    pub amount: Amount,
    /// First instant at which the shares are free.
    pub unlock_time: Timestamp,
}

impl TimelockEntry {
    /// Whether the lock has lapsed at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.unlock_time
    }
}

/// Insertion-ordered timelock entries, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockQueue {
    entries: VecDeque<TimelockEntry>,
}

impl TimelockQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a queue from persisted entries.
    pub fn from_entries(entries: Vec<TimelockEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries front to back.
    pub fn iter(&self) -> impl Iterator<Item = &TimelockEntry> {
        self.entries.iter()
    }

    /// Append an entry, returning the effective unlock time.
    ///
    /// The unlock time is raised to the newest entry's if needed, so a
    /// shortened lock duration never frees later shares before earlier ones.
    pub fn push(&mut self, amount: Amount, unlock_time: Timestamp) -> Timestamp {
        let unlock_time = self
            .entries
            .back()
            .map_or(unlock_time, |last| unlock_time.max(last.unlock_time));
        self.entries.push_back(TimelockEntry {
            amount,
            unlock_time,
        });
        unlock_time
    }

    /// Shares still locked at `now`.
    pub fn locked_amount(&self, now: Timestamp) -> Amount {
        self.entries
            .iter()
            .rev()
            .take_while(|entry| !entry.is_expired(now))
            .map(|entry| entry.amount)
            .sum()
    }

    /// Whether any expired entry is still queued.
    pub fn has_expired(&self, now: Timestamp) -> bool {
        self.entries
            .front()
            .is_some_and(|entry| entry.is_expired(now))
    }

    /// Remove up to `max_entries` expired entries from the front.
    ///
    /// Returns true when no expired entry remains.
    pub fn cleanup(&mut self, now: Timestamp, max_entries: usize) -> bool {
        let mut removed = 0;
        while removed < max_entries && self.has_expired(now) {
            self.entries.pop_front();
            removed += 1;
        }
        !self.has_expired(now)
    }

    /// Drop expired entries from the front while their amounts fit in `amount`.
    pub fn consume_expired(&mut self, now: Timestamp, amount: Amount) {
        let mut remaining = amount;
        while let Some(front) = self.entries.front() {
            if !front.is_expired(now) || front.amount > remaining {
                break;
            }
            remaining -= front.amount;
            self.entries.pop_front();
        }
    }

    /// Release `amount` of still-locked shares, oldest lock first.
    ///
    /// Fully consumed locks are drained in one pass, so the cost is linear in
    /// the queue length however many entries go.
    pub fn consume_locked(&mut self, now: Timestamp, amount: Amount) {
        let first_locked = self.entries.partition_point(|entry| entry.is_expired(now));
        let mut remaining = amount;
        let mut end = first_locked;
        while end < self.entries.len() && self.entries[end].amount <= remaining {
            remaining -= self.entries[end].amount;
            end += 1;
        }
        self.entries.drain(first_locked..end);
        if remaining > 0 {
            if let Some(entry) = self.entries.get_mut(first_locked) {
                entry.amount -= remaining;
            }
        }
    }
}
