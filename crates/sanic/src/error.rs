/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `sanic` can emit.
///
/// ID generation itself never fails at runtime. Errors come from building a
/// worker with an unusable configuration, or from a poisoned lock when the
/// caller explicitly asks to observe poisoning through
/// [`LockWorker::try_next_id`].
///
/// [`LockWorker::try_next_id`]: crate::LockWorker::try_next_id
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker configuration cannot produce valid IDs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison and this
    /// variant is never produced.
    #[error("lock poisoned")]
    LockPoisoned,
}

/// Reasons a [`WorkerConfig`] is rejected.
///
/// [`WorkerConfig`]: crate::WorkerConfig
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `id_bits + sequence_bits + timestamp_bits + 1` must be a multiple of 6
    /// so the ID maps onto whole display characters.
    #[error("id_bits + sequence_bits + timestamp_bits + 1 = {total_bits} is not divisible by 6")]
    NotDivisibleBySix {
        /// The offending total, including the reserved bit.
        total_bits: u32,
    },

    /// The layout does not fit into a 64-bit integer.
    #[error("layout needs {total_bits} bits, at most 64 fit")]
    TooWide {
        /// The offending total, including the reserved bit.
        total_bits: u32,
    },

    /// A tick must span a non-zero amount of time.
    #[error("tick duration must be non-zero")]
    ZeroTick,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
