//! Virtual-clock timer queue
//!
//! Timers are keyed by (due time, schedule sequence), so timers due at the
//! same instant fire in the order they were scheduled. Cancelling a timer that
//! already fired or was already cancelled is a no-op.

use std::collections::BTreeMap;

/// Handle to a scheduled timer (unique for the lifetime of the queue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Show the next color in the cycle
    ColorAdvance,
    /// Post-score pause is over, resume cycling
    Resume,
    /// Target was not tapped in time
    TargetDeadline,
    /// Close the grace window
    GraceClear,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub kind: TimerKind,
    /// Round epoch the timer was scheduled for
    pub epoch: u32,
    pub due_ms: u64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    kind: TimerKind,
    epoch: u32,
}

/// Pending timers ordered by due time
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: BTreeMap<(u64, TimerHandle), Entry>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer to fire at `due_ms`
    pub fn schedule(&mut self, due_ms: u64, kind: TimerKind, epoch: u32) -> TimerHandle {
        let handle = TimerHandle(self.next_seq);
        self.next_seq += 1;
        self.pending.insert((due_ms, handle), Entry { kind, epoch });
        handle
    }

    /// Cancel a timer. Returns true if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self
            .pending
            .keys()
            .find(|(_, h)| *h == handle)
            .copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Fired> {
        let (&(due_ms, handle), _) = self.pending.first_key_value()?;
        if due_ms > now_ms {
            return None;
        }
        let entry = self.pending.remove(&(due_ms, handle))?;
        Some(Fired {
            handle,
            kind: entry.kind,
            epoch: entry.epoch,
            due_ms,
        })
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.keys().any(|(_, h)| *h == handle)
    }

    /// Number of pending timers of the given kind
    pub fn count(&self, kind: TimerKind) -> usize {
        self.pending.values().filter(|e| e.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
