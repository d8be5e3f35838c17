use crate::{ConfigError, Result};

/// Number of bits represented by one display character.
pub const BITS_PER_CHAR: u32 = 6;

/// The bit layout of a generated ID.
///
/// ```text
///  Bit Index:  total-1      total-2                              0
///              +--------------+----------------+-------------+---------------+
///  Field:      | reserved (1) | timestamp (ts) | worker (id) | sequence (seq)|
///              +--------------+----------------+-------------+---------------+
///              |<----- MSB ------------- total_bits --------------- LSB ---->|
/// ```
///
/// The reserved bit keeps IDs non-negative. `total_bits` counts it, and must be
/// a multiple of [`BITS_PER_CHAR`] so every ID encodes to a fixed number of
/// display characters.
///
/// # Example
///
/// ```
/// use sanic::Layout;
///
/// let layout = Layout::new(5, 13, 41).unwrap();
/// assert_eq!(layout.total_bits(), 60);
/// assert_eq!(layout.display_len(), 10);
///
/// let id = layout.compose(1000, 2, 1);
/// let parts = layout.decompose(id);
/// assert_eq!((parts.timestamp, parts.worker_id, parts.sequence), (1000, 2, 1));
///
/// assert!(Layout::new(5, 13, 40).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    id_bits: u8,
    sequence_bits: u8,
    timestamp_bits: u8,
    id_shift: u32,
    timestamp_shift: u32,
    total_bits: u32,
}

/// The fields of an ID, as packed by [`Layout::compose`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parts {
    /// Ticks since the worker's epoch.
    pub timestamp: i64,
    /// The worker (shard) that produced the ID.
    pub worker_id: i64,
    /// Position of the ID within its tick.
    pub sequence: i64,
}

impl Parts {
    /// Returns the absolute tick (not epoch-relative) the ID was produced in.
    ///
    /// Returns `None` if `timestamp + epoch` overflows, which only happens
    /// when decoding an ID under an epoch it was not generated with.
    pub const fn tick(&self, epoch: i64) -> Option<i64> {
        self.timestamp.checked_add(epoch)
    }
}

impl Layout {
    /// Builds a layout from field widths.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TooWide`] if the fields plus the reserved bit exceed
    ///   64 bits.
    /// - [`ConfigError::NotDivisibleBySix`] if the fields plus the reserved bit
    ///   are not a multiple of 6.
    pub const fn new(
        id_bits: u8,
        sequence_bits: u8,
        timestamp_bits: u8,
    ) -> Result<Self, ConfigError> {
        let total_bits = id_bits as u32 + sequence_bits as u32 + timestamp_bits as u32 + 1;
        if total_bits > u64::BITS {
            return Err(ConfigError::TooWide { total_bits });
        }
        if total_bits % BITS_PER_CHAR != 0 {
            return Err(ConfigError::NotDivisibleBySix { total_bits });
        }
        Ok(Self {
            id_bits,
            sequence_bits,
            timestamp_bits,
            id_shift: sequence_bits as u32,
            timestamp_shift: sequence_bits as u32 + id_bits as u32,
            total_bits,
        })
    }

    /// Width of the worker ID field.
    pub const fn id_bits(&self) -> u8 {
        self.id_bits
    }

    /// Width of the sequence field.
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Width of the timestamp field.
    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    /// Shift of the worker field; equal to `sequence_bits`.
    pub const fn id_shift(&self) -> u32 {
        self.id_shift
    }

    /// Shift of the timestamp field; equal to `sequence_bits + id_bits`.
    pub const fn timestamp_shift(&self) -> u32 {
        self.timestamp_shift
    }

    /// All field widths plus the reserved bit.
    pub const fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// Length of the display string for IDs of this layout.
    pub const fn display_len(&self) -> usize {
        (self.total_bits / BITS_PER_CHAR) as usize
    }

    /// Largest worker ID that fits its field.
    pub const fn max_worker_id(&self) -> i64 {
        mask(self.id_bits)
    }

    /// Largest sequence number within one tick.
    pub const fn max_sequence(&self) -> i64 {
        mask(self.sequence_bits)
    }

    /// Largest epoch-relative timestamp before the field overflows.
    pub const fn max_timestamp(&self) -> i64 {
        mask(self.timestamp_bits)
    }

    /// Number of distinct IDs a single worker can issue per tick.
    pub const fn ids_per_tick(&self) -> u64 {
        1 << self.sequence_bits
    }

    /// Packs the fields into an ID.
    ///
    /// No masking is applied: a field wider than its slot spills into the
    /// neighbouring field. Keeping `worker_id` within
    /// [`Self::max_worker_id`] is the caller's responsibility.
    pub const fn compose(&self, timestamp: i64, worker_id: i64, sequence: i64) -> i64 {
        (timestamp << self.timestamp_shift) | (worker_id << self.id_shift) | sequence
    }

    /// Splits an ID back into its fields.
    pub const fn decompose(&self, id: i64) -> Parts {
        Parts {
            timestamp: (id >> self.timestamp_shift) & mask(self.timestamp_bits),
            worker_id: (id >> self.id_shift) & mask(self.id_bits),
            sequence: id & mask(self.sequence_bits),
        }
    }
}

// Field widths are at most 59 bits in any valid layout, so this never
// overflows.
const fn mask(bits: u8) -> i64 {
    (1 << bits) - 1
}
