//! One-shot timers for the round scheduler.
//!
//! Each kind owns a single slot. Arming a kind replaces whatever was armed
//! there, and cancelling empties the slot, so a cancelled or superseded timer
//! can never fire. Timers fire only when the owner polls with a time at or
//! past the deadline.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Countdown,
    Wait,
    Miss,
    Advance,
}

impl TimerKind {
    const ALL: [TimerKind; 4] = [
        TimerKind::Countdown,
        TimerKind::Wait,
        TimerKind::Miss,
        TimerKind::Advance,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::Countdown => 0,
            TimerKind::Wait => 1,
            TimerKind::Miss => 2,
            TimerKind::Advance => 3,
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    slots: [Option<Instant>; 4],
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `kind` for `deadline`. Returns true if a stale timer of the same kind was replaced.
    pub fn arm(&mut self, kind: TimerKind, deadline: Instant) -> bool {
        self.slots[kind.slot()].replace(deadline).is_some()
    }

    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].take().is_some()
    }

    pub fn cancel_all(&mut self) {
        self.slots = [None; 4];
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Instant> {
        self.slots[kind.slot()]
    }

    pub fn armed_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().min().copied()
    }

    /// Removes and returns the earliest timer due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerKind, Instant)> {
        let (kind, deadline) = TimerKind::ALL
            .iter()
            .filter_map(|kind| self.deadline(*kind).map(|deadline| (*kind, deadline)))
            .filter(|(_, deadline)| *deadline <= now)
            .min_by_key(|(_, deadline)| *deadline)?;

        self.slots[kind.slot()] = None;
        Some((kind, deadline))
    }
}
