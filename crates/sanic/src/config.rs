use core::time::Duration;

use crate::{ConfigError, Layout, Result};

/// Sanic epoch: Friday, January 1, 2016 00:00:00 UTC
pub const SANIC_EPOCH: Duration = Duration::from_millis(1_451_606_400_000);

/// Converts an epoch given as time since the Unix epoch into ticks of `tick`.
///
/// Returns `None` for a zero `tick`, or when the tick count does not fit in
/// an `i64`.
///
/// ```
/// use core::time::Duration;
/// use sanic::{SANIC_EPOCH, epoch_in_ticks};
///
/// assert_eq!(epoch_in_ticks(SANIC_EPOCH, Duration::from_secs(1)), Some(1_451_606_400));
/// assert_eq!(epoch_in_ticks(Duration::MAX, Duration::from_nanos(1)), None);
/// ```
pub const fn epoch_in_ticks(epoch: Duration, tick: Duration) -> Option<i64> {
    let tick_nanos = tick.as_nanos();
    if tick_nanos == 0 {
        return None;
    }
    let ticks = epoch.as_nanos() / tick_nanos;
    if ticks > i64::MAX as u128 {
        return None;
    }
    Some(ticks as i64)
}

/// Everything needed to build a worker.
///
/// Bit widths must satisfy `id_bits + sequence_bits + timestamp_bits + 1 ≡ 0
/// (mod 6)`; this is checked by [`WorkerConfig::validate`], which every worker
/// constructor calls. `worker_id` is deliberately **not** checked against
/// `id_bits`: assigning distinct, in-range worker IDs is up to the caller.
///
/// The presets ([`Self::TEN_CHARS`] and friends) use worker 0 and
/// [`SANIC_EPOCH`]. Pick one and override the worker:
///
/// ```
/// use sanic::WorkerConfig;
///
/// let config = WorkerConfig::NINE_CHARS.with_worker_id(3);
/// let layout = config.validate().unwrap();
/// assert_eq!(layout.display_len(), 9);
/// assert_eq!(config.ids_per_tick(), Some(8192));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkerConfig {
    /// Identifies this worker among its peers, `0 ≤ worker_id < 2^id_bits`.
    pub worker_id: i64,
    /// Zero point of the timestamp field, in ticks since the Unix epoch.
    pub epoch: i64,
    /// Width of the worker ID field.
    pub id_bits: u8,
    /// Width of the per-tick sequence field.
    pub sequence_bits: u8,
    /// Width of the timestamp field.
    pub timestamp_bits: u8,
    /// Real time covered by one unit of the timestamp field.
    pub tick: Duration,
}

impl WorkerConfig {
    /// Up to 8,192,000 IDs per second for 69 years; 10 display characters.
    pub const TEN_CHARS: Self = Self::preset(5, 13, 41, Duration::from_millis(1));

    /// Up to 819,200 IDs per second for 87 years; 9 display characters.
    pub const NINE_CHARS: Self = Self::preset(2, 13, 38, Duration::from_millis(10));

    /// Up to 40,960 IDs per second for 54 years; 8 display characters.
    pub const EIGHT_CHARS: Self = Self::preset(1, 12, 34, Duration::from_millis(100));

    /// Up to 1,024 IDs per second for 68 years; 7 display characters.
    pub const SEVEN_CHARS: Self = Self::preset(0, 10, 31, Duration::from_secs(1));

    /// Creates a configuration from its raw parts. Nothing is checked until
    /// [`Self::validate`].
    pub const fn new(
        worker_id: i64,
        epoch: i64,
        id_bits: u8,
        sequence_bits: u8,
        timestamp_bits: u8,
        tick: Duration,
    ) -> Self {
        Self {
            worker_id,
            epoch,
            id_bits,
            sequence_bits,
            timestamp_bits,
            tick,
        }
    }

    // Only evaluated in constant items, so a bad preset fails the build.
    const fn preset(id_bits: u8, sequence_bits: u8, timestamp_bits: u8, tick: Duration) -> Self {
        let epoch = match epoch_in_ticks(SANIC_EPOCH, tick) {
            Some(epoch) => epoch,
            None => panic!("preset epoch does not fit its tick"),
        };
        Self::new(
            0,
            epoch,
            id_bits,
            sequence_bits,
            timestamp_bits,
            tick,
        )
    }

    /// Replaces the worker ID.
    #[must_use]
    pub const fn with_worker_id(mut self, worker_id: i64) -> Self {
        self.worker_id = worker_id;
        self
    }

    /// Replaces the epoch, given in ticks since the Unix epoch.
    #[must_use]
    pub const fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    /// Checks the configuration and returns the resulting bit layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when the tick is zero or the
    /// bit widths do not form a valid [`Layout`].
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn validate(&self) -> Result<Layout> {
        if self.tick.is_zero() {
            return Err(ConfigError::ZeroTick.into());
        }
        Ok(Layout::new(
            self.id_bits,
            self.sequence_bits,
            self.timestamp_bits,
        )?)
    }

    /// Real time the timestamp field covers before it overflows, counted from
    /// the epoch.
    ///
    /// Returns `None` if the span does not fit in a [`Duration`].
    pub fn horizon(&self) -> Option<Duration> {
        let ticks = 1_u128.checked_shl(u32::from(self.timestamp_bits))?;
        let nanos = self.tick.as_nanos().checked_mul(ticks)?;
        let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
        Some(Duration::new(secs, (nanos % 1_000_000_000) as u32))
    }

    /// Number of IDs one worker can issue per tick.
    ///
    /// Returns `None` if `sequence_bits` is too wide to count in a `u64`,
    /// which no valid layout allows.
    pub const fn ids_per_tick(&self) -> Option<u64> {
        1_u64.checked_shl(self.sequence_bits as u32)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::TEN_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const YEAR: u64 = 365 * 24 * 60 * 60;

    #[test]
    fn presets_map_to_their_display_lengths() {
        let presets = [
            (WorkerConfig::TEN_CHARS, 10),
            (WorkerConfig::NINE_CHARS, 9),
            (WorkerConfig::EIGHT_CHARS, 8),
            (WorkerConfig::SEVEN_CHARS, 7),
        ];
        for (config, chars) in presets {
            let layout = config.validate().unwrap();
            assert_eq!(layout.display_len(), chars, "{config:?}");
            assert_eq!(config.worker_id, 0);
        }
    }

    #[test]
    fn preset_epochs_are_2016_in_tick_units() {
        assert_eq!(WorkerConfig::TEN_CHARS.epoch, 1_451_606_400_000);
        assert_eq!(WorkerConfig::NINE_CHARS.epoch, 145_160_640_000);
        assert_eq!(WorkerConfig::EIGHT_CHARS.epoch, 14_516_064_000);
        assert_eq!(WorkerConfig::SEVEN_CHARS.epoch, 1_451_606_400);
    }

    #[test]
    fn preset_horizons() {
        let years = |c: WorkerConfig| c.horizon().unwrap().as_secs() / YEAR;
        assert_eq!(years(WorkerConfig::TEN_CHARS), 69);
        assert_eq!(years(WorkerConfig::NINE_CHARS), 87);
        assert_eq!(years(WorkerConfig::EIGHT_CHARS), 54);
        assert_eq!(years(WorkerConfig::SEVEN_CHARS), 68);
    }

    #[test]
    fn preset_throughput() {
        let per_second = |c: WorkerConfig, ticks: u64| c.ids_per_tick().unwrap() * ticks;
        assert_eq!(per_second(WorkerConfig::TEN_CHARS, 1000), 8_192_000);
        assert_eq!(per_second(WorkerConfig::NINE_CHARS, 100), 819_200);
        assert_eq!(per_second(WorkerConfig::EIGHT_CHARS, 10), 40_960);
        assert_eq!(per_second(WorkerConfig::SEVEN_CHARS, 1), 1_024);
    }

    #[test]
    fn ids_per_tick_is_none_past_64_bits() {
        let config = WorkerConfig::new(0, 0, 0, 64, 0, Duration::from_millis(1));
        assert_eq!(config.ids_per_tick(), None);
        assert!(config.validate().is_err());

        let config = WorkerConfig::new(0, 0, 0, 0, 5, Duration::from_millis(1));
        assert_eq!(config.ids_per_tick(), Some(1));
    }

    #[test]
    fn validate_rejects_bad_bit_sum() {
        let config = WorkerConfig::new(0, 0, 5, 13, 40, Duration::from_millis(1));
        assert_eq!(
            config.validate(),
            Err(Error::InvalidConfiguration(ConfigError::NotDivisibleBySix {
                total_bits: 59
            }))
        );

        let config = WorkerConfig::new(0, 0, 5, 13, 41, Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_tick() {
        let config = WorkerConfig::TEN_CHARS;
        let config = WorkerConfig { tick: Duration::ZERO, ..config };
        assert_eq!(
            config.validate(),
            Err(Error::InvalidConfiguration(ConfigError::ZeroTick))
        );
    }

    #[test]
    fn worker_id_is_not_range_checked() {
        let config = WorkerConfig::EIGHT_CHARS.with_worker_id(1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_override_fields() {
        let config = WorkerConfig::default().with_worker_id(7).with_epoch(42);
        assert_eq!(config.worker_id, 7);
        assert_eq!(config.epoch, 42);
        assert_eq!(config.tick, WorkerConfig::TEN_CHARS.tick);
    }

    #[test]
    fn epoch_in_ticks_handles_zero_tick() {
        assert_eq!(epoch_in_ticks(SANIC_EPOCH, Duration::ZERO), None);
    }

    #[test]
    fn epoch_in_ticks_rejects_counts_past_i64() {
        let max_millis = Duration::from_millis(u64::MAX);
        assert_eq!(epoch_in_ticks(max_millis, Duration::from_millis(1)), None);
        assert_eq!(
            epoch_in_ticks(max_millis, Duration::from_millis(2)),
            Some(i64::MAX)
        );
        assert_eq!(
            epoch_in_ticks(Duration::from_millis(1_500), Duration::from_millis(1)),
            Some(1_500)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_deserializes_from_json() {
        let json = r#"{
            "worker_id": 3,
            "epoch": 0,
            "id_bits": 0,
            "sequence_bits": 0,
            "timestamp_bits": 5,
            "tick": { "secs": 1, "nanos": 0 }
        }"#;
        let config: WorkerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config,
            WorkerConfig::new(3, 0, 0, 0, 5, Duration::from_secs(1))
        );
        assert_eq!(serde_json::to_value(config).unwrap()["worker_id"], 3);
    }
}
