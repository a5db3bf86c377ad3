use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::trace;

/// Shortest delay a wake request is armed with.
pub const MIN_REARM_INTERVAL: Duration = Duration::from_millis(10);

/// Host hook that schedules a repaint of the widget after `delay`.
///
/// Called from producer threads, so implementations must only post a
/// message to the host event loop.
pub trait WakeTrigger: Send + Sync {
    fn request_wake(&self, delay: Duration);
}

/// Trigger for hosts that poll `is_outdated` on their own schedule.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWakeTrigger;

impl WakeTrigger for NoopWakeTrigger {
    fn request_wake(&self, _delay: Duration) {}
}

/// Coalesces repaint requests into at most one pending wake.
///
/// A request while an earlier-or-equal deadline is still pending is dropped;
/// otherwise the deadline is re-armed, never closer than
/// [`MIN_REARM_INTERVAL`].
pub struct WakeScheduler {
    trigger: Arc<dyn WakeTrigger>,
    delay_ms: AtomicU64,
    pending: Mutex<Option<Instant>>,
}

impl fmt::Debug for WakeScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakeScheduler")
            .field("delay", &self.delay())
            .field("pending", &*self.lock_pending())
            .finish_non_exhaustive()
    }
}

impl WakeScheduler {
    #[must_use]
    pub fn new(trigger: Arc<dyn WakeTrigger>, delay: Duration) -> Self {
        let scheduler = Self {
            trigger,
            delay_ms: AtomicU64::new(0),
            pending: Mutex::new(None),
        };
        scheduler.set_delay(delay);
        scheduler
    }

    /// Default delay used by [`WakeScheduler::request`].
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::Relaxed))
    }

    pub fn set_delay(&self, delay: Duration) {
        let delay = delay.max(MIN_REARM_INTERVAL);
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_ms.store(millis, Ordering::Relaxed);
    }

    /// Requests a wake after the default delay. Returns `true` if the host
    /// trigger was called.
    pub fn request(&self) -> bool {
        self.request_with_delay_at(self.delay(), Instant::now())
    }

    pub fn request_with_delay(&self, delay: Duration) -> bool {
        self.request_with_delay_at(delay, Instant::now())
    }

    pub fn request_with_delay_at(&self, delay: Duration, now: Instant) -> bool {
        let delay = delay.max(MIN_REARM_INTERVAL);
        let deadline = now + delay;
        {
            let mut pending = self.lock_pending();
            if let Some(existing) = *pending {
                if existing > now && existing <= deadline {
                    return false;
                }
            }
            *pending = Some(deadline);
        }
        trace!(delay_ms = delay.as_millis() as u64, "wake requested");
        self.trigger.request_wake(delay);
        true
    }

    /// Clears the pending deadline once the host delivered the wake.
    pub fn fired(&self) {
        *self.lock_pending() = None;
    }

    #[must_use]
    pub fn is_pending_at(&self, now: Instant) -> bool {
        self.lock_pending().is_some_and(|deadline| deadline > now)
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[derive(Default)]
    struct CountingTrigger {
        calls: AtomicUsize,
    }

    impl WakeTrigger for CountingTrigger {
        fn request_wake(&self, _delay: Duration) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scheduler(delay_ms: u64) -> (Arc<CountingTrigger>, WakeScheduler) {
        let trigger = Arc::new(CountingTrigger::default());
        let scheduler = WakeScheduler::new(trigger.clone(), Duration::from_millis(delay_ms));
        (trigger, scheduler)
    }

    #[test]
    fn burst_of_requests_arms_one_wake() {
        let (trigger, scheduler) = scheduler(500);
        let start = Instant::now();

        assert!(scheduler.request_with_delay_at(scheduler.delay(), start));
        for step in 1..50 {
            let now = start + Duration::from_millis(step);
            assert!(!scheduler.request_with_delay_at(scheduler.delay(), now));
        }
        assert_eq!(trigger.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shorter_request_rearms_earlier() {
        let (trigger, scheduler) = scheduler(500);
        let start = Instant::now();

        scheduler.request_with_delay_at(Duration::from_millis(500), start);
        assert!(scheduler.request_with_delay_at(Duration::from_millis(10), start));
        assert_eq!(trigger.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn expired_or_fired_deadline_rearms() {
        let (trigger, scheduler) = scheduler(20);
        let start = Instant::now();

        scheduler.request_with_delay_at(scheduler.delay(), start);
        assert!(scheduler.request_with_delay_at(scheduler.delay(), start + Duration::from_millis(25)));
        scheduler.fired();
        assert!(!scheduler.is_pending_at(start));
        assert!(scheduler.request_with_delay_at(scheduler.delay(), start + Duration::from_millis(26)));
        assert_eq!(trigger.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn delay_is_floored() {
        let (_, scheduler) = scheduler(0);
        assert_eq!(scheduler.delay(), MIN_REARM_INTERVAL);
    }
}
