#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(not(feature = "parking-lot"))]
use crate::generator::PoisonError;
use crate::{
    ConfigError, IdGenerator, Layout, Result, TimeSource, WallClock, WorkerConfig,
    generator::{Identity, Mutex, MutexGuard, State},
};

/// A lock-based ID generator suitable for multi-threaded environments.
///
/// The generation state sits behind a mutex held for the entire
/// algorithm, spin-waits included, so concurrent callers are fully
/// serialized. Share it with an `Arc` or a scoped borrow.
///
/// When you hold the worker exclusively, [`Self::next_id_mut`] skips the lock:
/// the `&mut self` receiver is the proof that nobody else can be generating.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Unlocked fast path under exclusive access
///
/// ## Recommended When
/// - Several threads draw IDs from one worker ID
///
/// ## See Also
/// - [`BasicWorker`]
///
/// [`BasicWorker`]: crate::BasicWorker
pub struct LockWorker<T = WallClock>
where
    T: TimeSource,
{
    identity: Identity,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    time: T,
}

impl LockWorker<WallClock> {
    /// Creates a worker that reads the wall clock in units of `config.tick`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    ///
    /// # Example
    /// ```
    /// use std::{collections::HashSet, thread};
    /// use sanic::{LockWorker, WorkerConfig};
    ///
    /// let worker = LockWorker::new(WorkerConfig::TEN_CHARS.with_worker_id(1)).unwrap();
    ///
    /// let ids: HashSet<i64> = thread::scope(|s| {
    ///     let handles: Vec<_> = (0..4)
    ///         .map(|_| s.spawn(|| (0..100).map(|_| worker.next_id()).collect::<Vec<_>>()))
    ///         .collect();
    ///     handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    /// });
    /// assert_eq!(ids.len(), 400);
    /// ```
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    pub fn new(config: WorkerConfig) -> Result<Self> {
        let time = WallClock::new(config.tick).ok_or(ConfigError::ZeroTick)?;
        Self::with_clock(config, time)
    }
}

impl<T> LockWorker<T>
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
        let state = Mutex::new(State::new(&time));
        Ok(Self {
            identity,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            time,
        })
    }

    /// Generates the next ID under the lock.
    ///
    /// A poisoned lock is recovered: nothing between the state's writes can
    /// panic, so the state is consistent even if a holder did. Use
    /// [`Self::try_next_id`] to observe poisoning instead.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> i64 {
        #[cfg(feature = "parking-lot")]
        let mut state = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        state.next_id(&self.identity, &self.time)
    }

    /// Generates the next ID under the lock, reporting a poisoned lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if another thread panicked while
    /// holding the lock. Never fails with the `parking-lot` feature.
    ///
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<i64> {
        let mut state = self.lock()?;
        Ok(state.next_id(&self.identity, &self.time))
    }

    /// Generates the next ID without locking.
    ///
    /// Exclusive access is guaranteed by the `&mut self` receiver, so this is
    /// as fast as [`BasicWorker::next_id`] while keeping the worker shareable
    /// afterwards.
    ///
    /// [`BasicWorker::next_id`]: crate::BasicWorker::next_id
    pub fn next_id_mut(&mut self) -> i64 {
        #[cfg(feature = "parking-lot")]
        let state = self.state.get_mut();
        #[cfg(not(feature = "parking-lot"))]
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);

        state.next_id(&self.identity, &self.time)
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

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

impl<T> IdGenerator<T> for LockWorker<T>
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
