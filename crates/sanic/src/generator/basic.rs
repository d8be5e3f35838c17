use core::cell::Cell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    ConfigError, IdGenerator, Layout, Result, TimeSource, WallClock, WorkerConfig,
    generator::{Identity, State},
};

/// A non-concurrent ID generator for a single thread.
///
/// The state lives in a [`Cell`], so this type is `!Sync`: the compiler
/// guarantees no two threads ever generate from the same instance, which is
/// what makes skipping the lock sound.
///
/// ## Features
/// - ❌ Not thread-safe (can still be moved to another thread)
/// - ✅ No locking on the hot path
///
/// ## Recommended When
/// - A single thread or task owns the worker
/// - You want the fastest generator
///
/// ## See Also
/// - [`LockWorker`]
///
/// [`LockWorker`]: crate::LockWorker
pub struct BasicWorker<T = WallClock>
where
    T: TimeSource,
{
    identity: Identity,
    state: Cell<State>,
    time: T,
}

impl BasicWorker<WallClock> {
    /// Creates a worker that reads the wall clock in units of `config.tick`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    ///
    /// # Example
    /// ```
    /// use sanic::{BasicWorker, IdGenerator, WorkerConfig};
    ///
    /// let worker = BasicWorker::new(WorkerConfig::TEN_CHARS).unwrap();
    /// let a = worker.next_id();
    /// let b = worker.next_id();
    /// assert!(a < b);
    /// assert_eq!(worker.id_string(b).len(), 10);
    /// ```
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn new(config: WorkerConfig) -> Result<Self> {
        let time = WallClock::new(config.tick).ok_or(ConfigError::ZeroTick)?;
        Self::with_clock(config, time)
    }
}

impl<T> BasicWorker<T>
where
    T: TimeSource,
{
    /// Creates a worker reading ticks from `time`.
    ///
    /// The clock is read once here to anchor the generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn with_clock(config: WorkerConfig, time: T) -> Result<Self> {
        let identity = Identity::from_config(&config)?;
        Ok(Self {
            identity,
            state: Cell::new(State::new(&time)),
            time,
        })
    }

    /// Generates the next ID without any synchronization.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> i64 {
        let mut state = self.state.get();
        let id = state.next_id(&self.identity, &self.time);
        self.state.set(state);
        id
    }

    /// Returns the bit layout IDs are packed with.
    pub fn layout(&self) -> Layout {
        self.identity.layout
    }

    /// Returns the worker ID stamped into every ID.
    pub fn worker_id(&self) -> i64 {
        self.identity.worker_id
    }

    /// Returns the epoch, in ticks since the Unix epoch.
    pub fn epoch(&self) -> i64 {
        self.identity.epoch
    }
}

impl<T> IdGenerator<T> for BasicWorker<T>
where
    T: TimeSource,
{
    fn with_clock(config: WorkerConfig, time: T) -> Result<Self> {
        Self::with_clock(config, time)
    }

    fn next_id(&self) -> i64 {
        self.next_id()
    }

    fn layout(&self) -> Layout {
        self.layout()
    }
}
