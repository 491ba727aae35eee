//! Cancellable tick-based timers
//!
//! Every scheduled callback in the simulation is a [`TimerEvent`] in one
//! ordered queue. Due events are popped in `(due_tick, sequence)` order, so
//! two timers due on the same tick fire in the order they were scheduled.

use std::collections::BTreeMap;

/// What happens when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Emit a ball and re-arm
    Spawn,
    /// Ball reached the paddle
    Contact { ball_id: u32 },
    /// Ghost ball crosses its recolor point
    ColorSwitch { ball_id: u32 },
    /// Level banner is over
    Resume,
}

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId {
    due: u64,
    seq: u64,
}

impl TimerId {
    pub fn due(&self) -> u64 {
        self.due
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    pending: BTreeMap<TimerId, TimerEvent>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` for tick `due`
    pub fn schedule(&mut self, due: u64, event: TimerEvent) -> TimerId {
        let id = TimerId {
            due,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(id, event);
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Cancel everything
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest timer due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, TimerEvent)> {
        let (&id, _) = self.pending.first_key_value()?;
        if id.due > now {
            return None;
        }
        self.pending.pop_first()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(5, TimerEvent::Resume);
        q.schedule(3, TimerEvent::Contact { ball_id: 1 });
        q.schedule(3, TimerEvent::Contact { ball_id: 2 });

        assert_eq!(q.pop_due(2), None);
        assert_eq!(q.pop_due(10).map(|(_, e)| e), Some(TimerEvent::Contact { ball_id: 1 }));
        assert_eq!(q.pop_due(10).map(|(_, e)| e), Some(TimerEvent::Contact { ball_id: 2 }));
        assert_eq!(q.pop_due(4), None);
        assert_eq!(q.pop_due(5).map(|(_, e)| e), Some(TimerEvent::Resume));
        assert!(q.is_empty());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(1, TimerEvent::Spawn);
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.pop_due(100), None);
    }

    #[test]
    fn test_clear_drops_all() {
        let mut q = TimerQueue::new();
        q.schedule(1, TimerEvent::Spawn);
        q.schedule(2, TimerEvent::Resume);
        q.clear();
        assert_eq!(q.len(), 0);
        assert_eq!(q.pop_due(u64::MAX), None);
    }
}
