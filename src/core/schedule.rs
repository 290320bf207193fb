//! Cancellable Timers on a Logical Clock
//!
//! Every timed phase boundary (reveal steps, settle delays, periodic ticks)
//! is a scheduled payload tagged with the [`Epoch`] of the instance that
//! requested it. Cancelling an epoch removes all of its timers at once; any
//! timer that still surfaces with an old epoch is dropped by the caller.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

/// Logical time in milliseconds since session creation.
pub type Millis = u64;

/// Generation token for one game instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Epoch(pub u32);

impl Epoch {
    /// The token for the next instance.
    #[inline]
    pub fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }
}

/// Handle returned by [`Scheduler::schedule`], usable for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimerHandle {
    due: Millis,
    seq: u64,
}

impl TimerHandle {
    /// When the timer fires.
    pub fn due(&self) -> Millis {
        self.due
    }
}

/// A timer popped from the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled<T> {
    /// Handle it was scheduled under.
    pub handle: TimerHandle,
    /// Epoch it belongs to.
    pub epoch: Epoch,
    /// Timer payload.
    pub payload: T,
}

/// Ordered timer queue.
///
/// Timers due at the same instant fire in scheduling order.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    queue: BTreeMap<(Millis, u64), (Epoch, T)>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to fire at `due`.
    pub fn schedule(&mut self, due: Millis, epoch: Epoch, payload: T) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((due, seq), (epoch, payload));
        TimerHandle { due, seq }
    }

    /// Cancel a single timer. Returns its payload if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        self.queue.remove(&(handle.due, handle.seq)).map(|(_, payload)| payload)
    }

    /// Cancel every timer belonging to `epoch`. Returns how many were removed.
    pub fn cancel_epoch(&mut self, epoch: Epoch) -> usize {
        let before = self.queue.len();
        self.queue.retain(|_, (timer_epoch, _)| *timer_epoch != epoch);
        before - self.queue.len()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Scheduled<T>> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > now {
            return None;
        }
        let (epoch, payload) = self.queue.remove(&(due, seq))?;
        Some(Scheduled {
            handle: TimerHandle { due, seq },
            epoch,
            payload,
        })
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pending timers in firing order.
    pub fn iter(&self) -> impl Iterator<Item = (Millis, Epoch, &T)> {
        self.queue.iter().map(|((due, _), (epoch, payload))| (*due, *epoch, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_then_schedule_order() {
        let mut timers = Scheduler::new();
        let epoch = Epoch(1);
        timers.schedule(500, epoch, "late");
        timers.schedule(100, epoch, "first");
        timers.schedule(100, epoch, "second");

        assert_eq!(timers.next_due(), Some(100));
        assert_eq!(timers.pop_due(1000).map(|t| t.payload), Some("first"));
        assert_eq!(timers.pop_due(1000).map(|t| t.payload), Some("second"));
        assert_eq!(timers.pop_due(1000).map(|t| t.payload), Some("late"));
        assert!(timers.pop_due(1000).is_none());
    }

    #[test]
    fn test_pop_due_respects_clock() {
        let mut timers = Scheduler::new();
        timers.schedule(300, Epoch(0), 1);

        assert!(timers.pop_due(299).is_none());
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(300).map(|t| t.payload), Some(1));
    }

    #[test]
    fn test_cancel_single() {
        let mut timers = Scheduler::new();
        let keep = timers.schedule(10, Epoch(0), 'a');
        let drop = timers.schedule(20, Epoch(0), 'b');

        assert_eq!(timers.cancel(drop), Some('b'));
        assert_eq!(timers.cancel(drop), None);
        assert_eq!(keep.due(), 10);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_epoch_leaves_others() {
        let mut timers = Scheduler::new();
        let old = Epoch(3);
        let new = old.next();
        timers.schedule(10, old, "stale");
        timers.schedule(20, old, "stale");
        timers.schedule(15, new, "live");

        assert_eq!(timers.cancel_epoch(old), 2);
        let popped = timers.pop_due(100).map(|t| (t.epoch, t.payload));
        assert_eq!(popped, Some((new, "live")));
        assert!(timers.is_empty());
    }
}
