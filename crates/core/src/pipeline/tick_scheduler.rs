use std::time::{Duration, Instant};

/// Fixed-period deadline tracker for the inference loop.
///
/// Pure arithmetic over caller-supplied instants: it never sleeps. Overruns
/// skip the missed deadlines rather than queueing them, so at most one tick
/// is ever due.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    period: Duration,
    next: Option<Instant>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        debug_assert!(!period.is_zero(), "tick period must be positive");
        Self { period, next: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Arms the first deadline one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    /// Returns `Some(missed)` if a tick is due at `now`, where `missed` is the
    /// number of whole periods that elapsed without a tick.
    ///
    /// The next deadline stays on the original period grid.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        let due = self.next?;
        if now < due {
            return None;
        }
        let late = now.duration_since(due);
        let missed = (late.as_nanos() / self.period.as_nanos()) as u64;
        let advance = self.period * (missed as u32).saturating_add(1);
        self.next = Some(due + advance);
        Some(missed)
    }

    /// Time left until the next deadline, zero if already due. `None` when stopped.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PERIOD: Duration = Duration::from_millis(50);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_stopped_scheduler_never_fires() {
        let mut scheduler = TickScheduler::new(PERIOD);
        let now = Instant::now();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.poll(now + ms(1000)), None);
        assert_eq!(scheduler.time_until_next(now), None);
    }

    #[test]
    fn test_not_due_before_deadline() {
        let mut scheduler = TickScheduler::new(PERIOD);
        let t0 = Instant::now();
        scheduler.start(t0);
        assert_eq!(scheduler.poll(t0), None);
        assert_eq!(scheduler.poll(t0 + ms(49)), None);
        assert_eq!(scheduler.time_until_next(t0 + ms(20)), Some(ms(30)));
    }

    #[test]
    fn test_fires_at_deadline_and_rearms() {
        let mut scheduler = TickScheduler::new(PERIOD);
        let t0 = Instant::now();
        scheduler.start(t0);
        assert_eq!(scheduler.poll(t0 + ms(50)), Some(0));
        assert_eq!(scheduler.poll(t0 + ms(60)), None);
        assert_eq!(scheduler.time_until_next(t0 + ms(60)), Some(ms(40)));
        assert_eq!(scheduler.poll(t0 + ms(100)), Some(0));
    }

    #[rstest]
    #[case(ms(120), 1, ms(150))]
    #[case(ms(199), 2, ms(200))]
    #[case(ms(200), 3, ms(250))]
    #[case(ms(1050), 20, ms(1100))]
    fn test_overrun_skips_missed_ticks(
        #[case] late_by: Duration,
        #[case] expected_missed: u64,
        #[case] next_deadline: Duration,
    ) {
        let mut scheduler = TickScheduler::new(PERIOD);
        let t0 = Instant::now();
        scheduler.start(t0);
        let now = t0 + late_by;
        assert_eq!(scheduler.poll(now), Some(expected_missed));
        assert_eq!(scheduler.time_until_next(now), Some(t0 + next_deadline - now));
    }

    #[test]
    fn test_time_until_next_is_zero_when_overdue() {
        let mut scheduler = TickScheduler::new(PERIOD);
        let t0 = Instant::now();
        scheduler.start(t0);
        assert_eq!(scheduler.time_until_next(t0 + ms(80)), Some(Duration::ZERO));
    }

    #[test]
    fn test_stop_then_restart_rearms_from_new_origin() {
        let mut scheduler = TickScheduler::new(PERIOD);
        let t0 = Instant::now();
        scheduler.start(t0);
        scheduler.stop();
        assert_eq!(scheduler.poll(t0 + ms(500)), None);

        scheduler.start(t0 + ms(500));
        assert_eq!(scheduler.poll(t0 + ms(540)), None);
        assert_eq!(scheduler.poll(t0 + ms(550)), Some(0));
    }
}
