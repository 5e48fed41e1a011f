use std::time::Duration;

/// One-shot timers owned by a single component.
///
/// Nothing fires unless the owner ticks it, and `clear()` drops everything
/// pending, so leaving a screen cannot leak a callback into the next one.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    pending: Vec<(Duration, T)>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<T> Timers<T> {
    pub fn after(&mut self, delay: Duration, item: T) {
        self.pending.push((delay, item));
    }

    /// Advances every timer by `dt` and returns the ones that came due,
    /// earliest first. Ties keep scheduling order.
    pub fn tick(&mut self, dt: Duration) -> Vec<T> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        let mut due = Vec::new();
        let mut keep = Vec::with_capacity(self.pending.len());
        for (remaining, item) in self.pending.drain(..) {
            if remaining <= dt {
                due.push((remaining, item));
            } else {
                keep.push((remaining - dt, item));
            }
        }
        self.pending = keep;
        due.sort_by_key(|(remaining, _)| *remaining);
        due.into_iter().map(|(_, item)| item).collect()
    }

    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) {
        self.pending.retain(|(_, item)| !pred(item));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Repeating timer.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    elapsed: Duration,
    running: bool,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self { period, elapsed: Duration::ZERO, running: true }
    }

    pub fn stopped(period: Duration) -> Self {
        Self { running: false, ..Self::new(period) }
    }

    /// Returns how many periods completed during `dt`.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        if !self.running || self.period.is_zero() {
            return 0;
        }
        self.elapsed += dt;
        let mut fired = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn timers_fire_in_due_order() {
        let mut timers = Timers::default();
        timers.after(MS(500), "late");
        timers.after(MS(100), "early");
        timers.after(MS(900), "never");

        assert!(timers.tick(MS(99)).is_empty());
        assert_eq!(timers.tick(MS(450)), vec!["early", "late"]);
        assert_eq!(timers.len(), 1);

        timers.clear();
        assert!(timers.tick(MS(1000)).is_empty());
    }

    #[test]
    fn interval_counts_whole_periods() {
        let mut interval = Interval::new(MS(15_000));
        assert_eq!(interval.tick(MS(14_999)), 0);
        assert_eq!(interval.tick(MS(1)), 1);
        assert_eq!(interval.tick(MS(30_000)), 2);

        interval.stop();
        assert_eq!(interval.tick(MS(60_000)), 0);
        interval.restart();
        assert_eq!(interval.tick(MS(15_000)), 1);
    }
}
