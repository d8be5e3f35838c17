use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of ticks: the number of whole tick durations elapsed since a fixed
/// origin.
///
/// Ticks are **not** epoch-adjusted; the generator subtracts its epoch only
/// when packing an ID. This abstraction lets you plug in the wall clock, a
/// monotonic timer, or a scripted time source in tests.
///
/// # Example
///
/// ```
/// use sanic::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_tick(&self) -> i64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_tick(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current tick.
    fn current_tick(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_tick(&self) -> i64 {
        (**self).current_tick()
    }
}

/// Wall-clock ticks: Unix time in nanoseconds divided by the tick duration.
///
/// The wall clock may be adjusted backwards (NTP, manual changes). Generators
/// detect that and spin until the clock catches up again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WallClock {
    tick_nanos: u128,
}

impl WallClock {
    /// Creates a clock counting in units of `tick`.
    ///
    /// Returns `None` for a zero `tick`.
    pub const fn new(tick: Duration) -> Option<Self> {
        let tick_nanos = tick.as_nanos();
        if tick_nanos == 0 {
            return None;
        }
        Some(Self { tick_nanos })
    }

    /// The duration of one tick.
    pub fn tick(&self) -> Duration {
        // `tick_nanos` came from a `Duration`, so it fits.
        Duration::new(
            (self.tick_nanos / 1_000_000_000) as u64,
            (self.tick_nanos % 1_000_000_000) as u32,
        )
    }

    fn ticks_in(&self, elapsed: Duration) -> i64 {
        i64::try_from(elapsed.as_nanos() / self.tick_nanos).unwrap_or(i64::MAX)
    }
}

impl TimeSource for WallClock {
    fn current_tick(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => self.ticks_in(elapsed),
            // Clock set before 1970: count backwards instead of failing.
            Err(e) => -self.ticks_in(e.duration()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tick_is_rejected() {
        assert!(WallClock::new(Duration::ZERO).is_none());
    }

    #[test]
    fn tick_round_trips() {
        let tick = Duration::from_millis(1_500);
        assert_eq!(WallClock::new(tick).unwrap().tick(), tick);
    }

    #[test]
    fn counts_whole_ticks_since_unix_epoch() {
        let clock = WallClock::new(Duration::from_millis(10)).unwrap();
        let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let tick = clock.current_tick();
        let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();

        let lo = i64::try_from(before.as_millis() / 10).unwrap();
        let hi = i64::try_from(after.as_millis() / 10).unwrap();
        assert!((lo..=hi).contains(&tick), "{lo} <= {tick} <= {hi}");
    }

    #[test]
    fn coarser_ticks_count_slower() {
        let millis = WallClock::new(Duration::from_millis(1)).unwrap();
        let seconds = WallClock::new(Duration::from_secs(1)).unwrap();
        let s = seconds.current_tick();
        let ms = millis.current_tick();
        assert!(ms / 1000 >= s);
        assert!(ms / 1000 - s <= 1);
    }

    #[test]
    fn references_are_time_sources() {
        fn read<T: TimeSource>(time: T) -> i64 {
            time.current_tick()
        }
        let clock = WallClock::new(Duration::from_secs(3600)).unwrap();
        assert!(read(&clock) > 0);
    }
}
