//! Event Loop
//!
//! A single-threaded timer queue standing in for the page's event loop.
//! Time is virtual: it only moves when [`EventLoop::advance`] or
//! [`EventLoop::run_realtime`] is called, which makes widget timing
//! deterministic under test.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeDelta};

use super::subscription::Subscription;

/// Shortest period an interval may repeat at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct Timer {
    period: Option<Duration>,
    callback: Box<dyn FnMut()>,
    subscription: Subscription,
}

struct LoopState {
    /// Virtual time since the loop was created
    now: Duration,
    /// Wall clock time the loop was created at
    started_at: DateTime<Local>,
    /// Tie breaker keeping scheduling order for timers due together
    next_seq: u64,
    timers: BTreeMap<(Duration, u64), Timer>,
}

/// Handle to a shared timer queue. Clones refer to the same queue.
///
/// # Example
///
/// ```rust,ignore
/// let event_loop = EventLoop::new();
/// let ticks = Rc::new(Cell::new(0));
/// let counter = ticks.clone();
/// event_loop.set_interval(Duration::from_secs(1), move || counter.set(counter.get() + 1));
///
/// event_loop.advance(Duration::from_millis(2500));
/// assert_eq!(ticks.get(), 2);
/// ```
#[derive(Clone)]
pub struct EventLoop {
    inner: Rc<RefCell<LoopState>>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("EventLoop")
            .field("now", &state.now)
            .field("timers", &state.timers.len())
            .finish()
    }
}

impl EventLoop {
    /// Create an event loop whose wall clock starts now
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    /// Create an event loop whose wall clock starts at the given time
    pub fn starting_at(started_at: DateTime<Local>) -> Self {
        EventLoop {
            inner: Rc::new(RefCell::new(LoopState {
                now: Duration::ZERO,
                started_at,
                next_seq: 0,
                timers: BTreeMap::new(),
            })),
        }
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Wall clock time: the start time plus the virtual time elapsed
    pub fn wall_clock(&self) -> DateTime<Local> {
        let state = self.inner.borrow();
        let elapsed = TimeDelta::from_std(state.now).unwrap_or(TimeDelta::zero());
        state.started_at + elapsed
    }

    /// Run `callback` once after `delay`
    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> Subscription {
        let mut callback = Some(callback);
        self.schedule(
            delay,
            None,
            Box::new(move || {
                if let Some(callback) = callback.take() {
                    callback();
                }
            }),
        )
    }

    /// Run `callback` every `period` until the returned subscription is cancelled
    pub fn set_interval(&self, period: Duration, callback: impl FnMut() + 'static) -> Subscription {
        let period = period.max(MIN_INTERVAL);
        self.schedule(period, Some(period), Box::new(callback))
    }

    fn schedule(
        &self,
        delay: Duration,
        period: Option<Duration>,
        callback: Box<dyn FnMut()>,
    ) -> Subscription {
        let subscription = Subscription::new();
        let mut state = self.inner.borrow_mut();
        let due = state.now + delay;
        Self::insert(
            &mut state,
            due,
            Timer {
                period,
                callback,
                subscription: subscription.clone(),
            },
        );
        subscription
    }

    fn insert(state: &mut LoopState, due: Duration, timer: Timer) {
        let seq = state.next_seq;
        state.next_seq += 1;
        state.timers.insert((due, seq), timer);
    }

    /// Number of timers that may still fire
    pub fn pending(&self) -> usize {
        self.inner
            .borrow()
            .timers
            .values()
            .filter(|t| !t.subscription.is_cancelled())
            .count()
    }

    /// Virtual time at which the next live timer is due
    pub fn next_due(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .timers
            .iter()
            .find(|(_, t)| !t.subscription.is_cancelled())
            .map(|((due, _), _)| *due)
    }

    /// Move virtual time forward by `by`, running every timer that falls due.
    ///
    /// Timers run in due order, ties in scheduling order. Callbacks may
    /// schedule new timers; those run too if they fall due before the
    /// deadline. Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let deadline = self.elapsed() + by;
        let mut ran = 0;

        while let Some((due, mut timer)) = self.pop_due(deadline) {
            if timer.subscription.is_cancelled() {
                continue;
            }

            // The queue must not be borrowed here: callbacks schedule timers.
            (timer.callback)();
            ran += 1;

            if let Some(period) = timer.period {
                if !timer.subscription.is_cancelled() {
                    Self::insert(&mut self.inner.borrow_mut(), due + period, timer);
                }
            }
        }

        self.inner.borrow_mut().now = deadline;
        ran
    }

    fn pop_due(&self, deadline: Duration) -> Option<(Duration, Timer)> {
        let mut state = self.inner.borrow_mut();
        let entry = state.timers.first_entry()?;
        if entry.key().0 > deadline {
            return None;
        }
        let ((due, _), timer) = entry.remove_entry();
        state.now = due;
        Some((due, timer))
    }

    /// Like [`EventLoop::advance`], but sleeps the thread so that timers fire
    /// at their real due times.
    pub fn run_realtime(&self, total: Duration) -> usize {
        let started = Instant::now();
        let begin = self.elapsed();
        let end = begin + total;
        let mut ran = 0;

        loop {
            let next = self.next_due().filter(|due| *due <= end);
            let until = next.unwrap_or(end);

            let wake_at = started + (until - begin);
            let now = Instant::now();
            if wake_at > now {
                thread::sleep(wake_at - now);
            }

            ran += self.advance(until.saturating_sub(self.elapsed()));
            if next.is_none() {
                return ran;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move || handle.set(handle.get() + 1))
    }

    #[test]
    fn test_timeout_fires_once() {
        let event_loop = EventLoop::new();
        let (count, tick) = counter();
        event_loop.set_timeout(Duration::from_millis(500), tick);

        assert_eq!(event_loop.advance(Duration::from_millis(499)), 0);
        assert_eq!(event_loop.advance(Duration::from_millis(1)), 1);
        assert_eq!(event_loop.advance(Duration::from_secs(10)), 0);
        assert_eq!(count.get(), 1);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_interval_repeats() {
        let event_loop = EventLoop::new();
        let (count, tick) = counter();
        event_loop.set_interval(Duration::from_secs(1), tick);

        event_loop.advance(Duration::from_millis(2500));
        assert_eq!(count.get(), 2);
        assert_eq!(event_loop.next_due(), Some(Duration::from_secs(3)));
        assert_eq!(event_loop.elapsed(), Duration::from_millis(2500));
    }

    #[test]
    fn test_cancelled_interval_stops() {
        let event_loop = EventLoop::new();
        let (count, tick) = counter();
        let subscription = event_loop.set_interval(Duration::from_secs(1), tick);

        event_loop.advance(Duration::from_secs(2));
        subscription.cancel();
        event_loop.advance(Duration::from_secs(5));

        assert_eq!(count.get(), 2);
        assert_eq!(event_loop.pending(), 0);
        assert_eq!(event_loop.next_due(), None);
    }

    #[test]
    fn test_callbacks_can_schedule_timers() {
        let event_loop = EventLoop::new();
        let (count, mut tick) = counter();
        let inner = event_loop.clone();
        event_loop.set_timeout(Duration::from_millis(100), move || {
            tick();
            inner.set_timeout(Duration::from_millis(100), tick);
        });

        event_loop.advance(Duration::from_millis(250));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_ties_run_in_scheduling_order() {
        let event_loop = EventLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = order.clone();
            event_loop.set_timeout(Duration::from_millis(10), move || {
                order.borrow_mut().push(label)
            });
        }

        event_loop.advance(Duration::from_millis(10));
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_zero_period_interval_is_clamped() {
        let event_loop = EventLoop::new();
        let (count, tick) = counter();
        event_loop.set_interval(Duration::ZERO, tick);

        event_loop.advance(Duration::from_millis(5));
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn test_wall_clock_follows_virtual_time() {
        let start = Local::now();
        let event_loop = EventLoop::starting_at(start);
        event_loop.advance(Duration::from_secs(90));

        assert_eq!(event_loop.wall_clock() - start, TimeDelta::seconds(90));
    }

    #[test]
    fn test_run_realtime_fires_due_timers() {
        let event_loop = EventLoop::new();
        let (count, tick) = counter();
        event_loop.set_interval(Duration::from_millis(10), tick);

        let ran = event_loop.run_realtime(Duration::from_millis(35));
        assert_eq!(ran, 3);
        assert_eq!(count.get(), 3);
        assert_eq!(event_loop.elapsed(), Duration::from_millis(35));
    }
}
