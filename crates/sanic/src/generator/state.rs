use core::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

use crate::{Layout, Result, TimeSource, WorkerConfig};

/// The immutable half of a worker: where its IDs go and how they are packed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) layout: Layout,
    pub(crate) worker_id: i64,
    pub(crate) epoch: i64,
}

impl Identity {
    pub(crate) fn from_config(config: &WorkerConfig) -> Result<Self> {
        let layout = config.validate()?;

        #[cfg(feature = "tracing")]
        {
            if !(0..=layout.max_worker_id()).contains(&config.worker_id) {
                warn!(
                    worker_id = config.worker_id,
                    id_bits = layout.id_bits(),
                    "worker id does not fit its field and will corrupt neighbouring bits"
                );
            }
            debug!(
                worker_id = config.worker_id,
                epoch = config.epoch,
                total_bits = layout.total_bits(),
                tick = ?config.tick,
                "worker configured"
            );
        }

        Ok(Self {
            layout,
            worker_id: config.worker_id,
            epoch: config.epoch,
        })
    }

    fn pack(&self, tick: i64, sequence: i64) -> i64 {
        self.layout
            .compose(tick.wrapping_sub(self.epoch), self.worker_id, sequence)
    }
}

/// The mutable half of a worker: the tick of the last ID and how many IDs were
/// already issued within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct State {
    pub(crate) last_tick: i64,
    pub(crate) sequence: i64,
}

impl State {
    /// Anchors the state at the current tick so the first ID reflects real
    /// time.
    pub(crate) fn new<T: TimeSource>(time: &T) -> Self {
        Self {
            last_tick: time.current_tick(),
            sequence: 0,
        }
    }

    /// Produces the next ID, spinning if the clock is behind or the tick's
    /// sequence space is used up.
    ///
    /// The caller must hold exclusive access to `self` for the whole call.
    pub(crate) fn next_id<T: TimeSource>(&mut self, identity: &Identity, time: &T) -> i64 {
        let tick = self.advance(time, identity.layout.max_sequence());
        identity.pack(tick, self.sequence)
    }

    fn advance<T: TimeSource>(&mut self, time: &T, max_sequence: i64) -> i64 {
        let mut now = time.current_tick();

        match now.cmp(&self.last_tick) {
            Ordering::Equal => {
                self.sequence = (self.sequence + 1) & max_sequence;
                if self.sequence == 0 {
                    now = self.cold_sequence_exhausted(time);
                }
            }
            Ordering::Greater => self.sequence = 0,
            Ordering::Less => {
                now = self.cold_clock_behind(time, now);
                self.sequence = 0;
            }
        }

        self.last_tick = now;
        now
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted<T: TimeSource>(&mut self, time: &T) -> i64 {
        #[cfg(feature = "tracing")]
        trace!(tick = self.last_tick, "sequence exhausted, waiting for next tick");
        self.wait_for_next_tick(time)
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn cold_clock_behind<T: TimeSource>(&mut self, time: &T, now: i64) -> i64 {
        #[cfg(feature = "tracing")]
        warn!(
            last_tick = self.last_tick,
            now,
            behind = self.last_tick - now,
            "clock moved backwards, waiting for it to catch up"
        );
        self.wait_for_next_tick(time)
    }

    /// Busy-polls `time` until it passes `last_tick`, then records and returns
    /// the new tick. Never sleeps or yields.
    fn wait_for_next_tick<T: TimeSource>(&mut self, time: &T) -> i64 {
        let mut now = time.current_tick();
        while now <= self.last_tick {
            core::hint::spin_loop();
            now = time.current_tick();
        }
        self.last_tick = now;
        now
    }
}
