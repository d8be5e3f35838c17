use crate::{Layout, Parts, Result, TimeSource, WorkerConfig, encoding::encode_chars};

/// A minimal interface for generating IDs.
pub trait IdGenerator<T>: Sized
where
    T: TimeSource,
{
    /// Creates a new generator reading ticks from `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` does not validate.
    ///
    /// [`Error::InvalidConfiguration`]: crate::Error::InvalidConfiguration
    fn with_clock(config: WorkerConfig, time: T) -> Result<Self>;

    /// Generates the next ID, spinning while the clock is behind or the
    /// current tick is exhausted.
    fn next_id(&self) -> i64;

    /// Returns the bit layout this generator packs IDs with.
    fn layout(&self) -> Layout;

    /// Encodes `id` as a fixed-width string sized for this generator's
    /// layout.
    fn id_string(&self, id: i64) -> String {
        encode_chars(id, self.layout().display_len())
    }

    /// Splits an ID produced by this generator into its fields.
    fn decompose(&self, id: i64) -> Parts {
        self.layout().decompose(id)
    }
}
