//! Effects Clock - Single Owner of Timers and Intervals
//!
//! Every delayed or periodic behavior in the scene (shooting-star checks,
//! link triggers, overlay expiry, delayed replies, conversation turns) is a
//! timer on this clock. The scheduler advances it once per frame and
//! dispatches the events that came due, so all mutation stays on the frame
//! context.
//!
//! # Pausing
//!
//! While paused, `advance` neither moves time nor fires anything. Every
//! timer is therefore delayed by exactly the paused span, which keeps
//! one-shots and intervals consistent with each other across a freeze.
//!
//! # Catch-up
//!
//! An interval fires at most once per `advance`; missed periods after a long
//! frame are dropped rather than replayed in a burst.

use std::time::Duration;

/// Shortest period an interval may have
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a scheduled timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Timer<E> {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
    event: E,
}

/// Pausable virtual clock owning one-shot timers and intervals
#[derive(Clone, Debug)]
pub struct EffectsClock<E> {
    now: Duration,
    paused: bool,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for EffectsClock<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            paused: false,
            next_id: 0,
            timers: Vec::new(),
        }
    }
}

impl<E: Clone> EffectsClock<E> {
    /// Create a running clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed running time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Whether the clock is paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause or resume
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::debug!(paused, now_ms = self.now.as_millis(), "Effects clock toggled");
        }
        self.paused = paused;
    }

    /// Schedule `event` to fire once after `delay`
    pub fn after(&mut self, delay: Duration, event: E) -> TimerId {
        self.insert(self.now + delay, None, event)
    }

    /// Schedule `event` to fire every `period`, first after one period
    pub fn every(&mut self, period: Duration, event: E) -> TimerId {
        let period = period.max(MIN_PERIOD);
        self.insert(self.now + period, Some(period), event)
    }

    /// Cancel a timer; returns whether it was still scheduled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Whether a timer is still scheduled
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    /// Number of scheduled timers
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Move time forward and collect the events that came due, in order
    pub fn advance(&mut self, dt: Duration) -> Vec<E> {
        if self.paused {
            return Vec::new();
        }
        self.now += dt;
        let now = self.now;

        let mut due: Vec<(Duration, TimerId, E)> = self
            .timers
            .iter()
            .filter(|timer| timer.due <= now)
            .map(|timer| (timer.due, timer.id, timer.event.clone()))
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort_by_key(|(at, id, _)| (*at, *id));

        self.timers.retain(|timer| timer.due > now || timer.period.is_some());
        for timer in &mut self.timers {
            if let Some(period) = timer.period {
                if timer.due <= now {
                    timer.due += period;
                    if timer.due <= now {
                        timer.due = now + period;
                    }
                }
            }
        }

        due.into_iter().map(|(_, _, event)| event).collect()
    }

    fn insert(&mut self, due: Duration, period: Option<Duration>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due,
            period,
            event,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut clock = EffectsClock::new();
        let id = clock.after(ms(100), "reply");
        assert!(clock.advance(ms(99)).is_empty());
        assert_eq!(clock.advance(ms(1)), vec!["reply"]);
        assert!(!clock.is_scheduled(id));
        assert!(clock.advance(ms(500)).is_empty());
    }

    #[test]
    fn test_interval_repeats() {
        let mut clock = EffectsClock::new();
        clock.every(ms(300), "link");
        let mut fired = 0;
        for _ in 0..90 {
            fired += clock.advance(ms(10)).len();
        }
        assert_eq!(fired, 3);
    }

    #[test]
    fn test_interval_drops_missed_periods() {
        let mut clock = EffectsClock::new();
        clock.every(ms(100), "tick");
        assert_eq!(clock.advance(ms(1000)).len(), 1);
        assert!(clock.advance(ms(50)).is_empty());
        assert_eq!(clock.advance(ms(50)).len(), 1);
    }

    #[test]
    fn test_events_come_out_in_due_order() {
        let mut clock = EffectsClock::new();
        clock.after(ms(30), "third");
        clock.after(ms(10), "first");
        clock.after(ms(20), "second");
        assert_eq!(clock.advance(ms(50)), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_pause_delays_every_timer_uniformly() {
        let mut clock = EffectsClock::new();
        clock.after(ms(100), "one-shot");
        clock.every(ms(100), "interval");

        clock.advance(ms(50));
        clock.set_paused(true);
        assert!(clock.advance(ms(10_000)).is_empty());
        assert_eq!(clock.now(), ms(50));
        clock.set_paused(false);

        assert!(clock.advance(ms(49)).is_empty());
        assert_eq!(clock.advance(ms(1)), vec!["one-shot", "interval"]);
    }

    #[test]
    fn test_cancel() {
        let mut clock = EffectsClock::new();
        let id = clock.every(ms(10), ());
        assert!(clock.cancel(id));
        assert!(!clock.cancel(id));
        assert!(clock.advance(ms(100)).is_empty());
        assert_eq!(clock.pending(), 0);
    }
}
