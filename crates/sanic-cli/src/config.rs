use core::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use sanic::{Layout, SANIC_EPOCH, WorkerConfig, epoch_in_ticks};

/// Runtime configuration for the `sanic` binary.
///
/// Start from a preset and override individual fields. Every value can also
/// come from the environment (or a `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sanic",
    version,
    about = "Generate and inspect short, sortable Snowflake-style IDs"
)]
pub struct CliArgs {
    /// Starting layout, named after its display width.
    ///
    /// Environment variable: `SANIC_PRESET`
    #[arg(long, env = "SANIC_PRESET", value_enum, default_value_t = Preset::Ten)]
    pub preset: Preset,

    /// Worker ID stamped into every generated ID. Must fit in `id_bits`.
    ///
    /// Environment variable: `SANIC_WORKER_ID`
    #[arg(short, long, env = "SANIC_WORKER_ID", default_value_t = 0)]
    pub worker_id: i64,

    /// Overrides the preset's worker ID width.
    #[arg(long, env = "SANIC_ID_BITS")]
    pub id_bits: Option<u8>,

    /// Overrides the preset's sequence width.
    #[arg(long, env = "SANIC_SEQUENCE_BITS")]
    pub sequence_bits: Option<u8>,

    /// Overrides the preset's timestamp width.
    #[arg(long, env = "SANIC_TIMESTAMP_BITS")]
    pub timestamp_bits: Option<u8>,

    /// Overrides the preset's tick length, in milliseconds.
    #[arg(long, env = "SANIC_TICK_MS")]
    pub tick_ms: Option<u64>,

    /// Overrides the epoch, in milliseconds since the Unix epoch.
    ///
    /// Defaults to 2016-01-01T00:00:00Z.
    #[arg(long, env = "SANIC_EPOCH_MS")]
    pub epoch: Option<u64>,

    /// Number of IDs to generate.
    #[arg(short = 'n', long, env = "SANIC_COUNT", default_value_t = 1)]
    pub count: usize,

    /// Number of threads drawing from one shared worker.
    #[arg(short, long, env = "SANIC_THREADS", default_value_t = 1)]
    pub threads: usize,

    /// How each generated ID is printed.
    #[arg(short, long, env = "SANIC_FORMAT", value_enum, default_value_t = Format::Int)]
    pub format: Format,

    /// Decode a display string into its fields instead of generating.
    #[arg(short, long, value_name = "STRING")]
    pub decode: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 1ms ticks, 5 worker bits, 13 sequence bits.
    Ten,
    /// 10ms ticks, 2 worker bits, 13 sequence bits.
    Nine,
    /// 100ms ticks, 1 worker bit, 12 sequence bits.
    Eight,
    /// 1s ticks, no worker bits, 10 sequence bits.
    Seven,
}

impl From<Preset> for WorkerConfig {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Ten => Self::TEN_CHARS,
            Preset::Nine => Self::NINE_CHARS,
            Preset::Eight => Self::EIGHT_CHARS,
            Preset::Seven => Self::SEVEN_CHARS,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The raw 64-bit integer.
    Int,
    /// The fixed-width sortable string.
    Display,
    /// Integer and string, tab separated.
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Generate {
        count: usize,
        threads: usize,
        format: Format,
    },
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub worker: WorkerConfig,
    pub layout: Layout,
    pub command: Command,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut worker = WorkerConfig::from(args.preset);

        if let Some(id_bits) = args.id_bits {
            worker.id_bits = id_bits;
        }
        if let Some(sequence_bits) = args.sequence_bits {
            worker.sequence_bits = sequence_bits;
        }
        if let Some(timestamp_bits) = args.timestamp_bits {
            worker.timestamp_bits = timestamp_bits;
        }
        if let Some(tick_ms) = args.tick_ms {
            if tick_ms == 0 {
                bail!("SANIC_TICK_MS must be greater than 0");
            }
            worker.tick = Duration::from_millis(tick_ms);
        }

        // The epoch is stored in ticks, so it follows any tick override.
        let since_unix = args.epoch.map_or(SANIC_EPOCH, Duration::from_millis);
        let Some(epoch) = epoch_in_ticks(since_unix, worker.tick) else {
            bail!(
                "SANIC_EPOCH_MS ({}) does not fit in 64 bits at {:?} per tick",
                since_unix.as_millis(),
                worker.tick
            );
        };
        worker.epoch = epoch;
        worker.worker_id = args.worker_id;

        let layout = worker.validate().context("invalid ID layout")?;

        if !(0..=layout.max_worker_id()).contains(&worker.worker_id) {
            bail!(
                "SANIC_WORKER_ID ({}) does not fit in {} bits (max = {})",
                worker.worker_id,
                layout.id_bits(),
                layout.max_worker_id()
            );
        }

        let command = match args.decode {
            Some(s) => Command::Decode(s),
            None => {
                if args.count == 0 {
                    bail!("SANIC_COUNT must be greater than 0");
                }
                if args.threads == 0 {
                    bail!("SANIC_THREADS must be greater than 0");
                }
                Command::Generate {
                    count: args.count,
                    threads: args.threads.min(args.count),
                    format: args.format,
                }
            }
        };

        Ok(Self {
            worker,
            layout,
            command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<RunConfig> {
        let args = CliArgs::try_parse_from(core::iter::once("sanic").chain(args.iter().copied()))?;
        RunConfig::try_from(args)
    }

    #[test]
    fn defaults_to_ten_chars() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.worker, WorkerConfig::TEN_CHARS);
        assert_eq!(config.layout.display_len(), 10);
        assert_eq!(
            config.command,
            Command::Generate {
                count: 1,
                threads: 1,
                format: Format::Int
            }
        );
    }

    #[test]
    fn presets_select_their_layouts() {
        for (name, len) in [("ten", 10), ("nine", 9), ("eight", 8), ("seven", 7)] {
            let config = parse(&["--preset", name]).unwrap();
            assert_eq!(config.layout.display_len(), len, "{name}");
        }
    }

    #[test]
    fn tick_override_rescales_the_epoch() {
        let config = parse(&["--preset", "ten", "--tick-ms", "1000"]).unwrap();
        assert_eq!(config.worker.tick, Duration::from_secs(1));
        assert_eq!(config.worker.epoch, 1_451_606_400);
    }

    #[test]
    fn explicit_epoch_is_converted_to_ticks() {
        let config = parse(&["--preset", "nine", "--epoch", "1000"]).unwrap();
        assert_eq!(config.worker.epoch, 100);
    }

    #[test]
    fn epoch_overflowing_its_tick_is_rejected() {
        let err = parse(&["--tick-ms", "1", "--epoch", "18446744073709551615"]).unwrap_err();
        assert!(err.to_string().contains("does not fit"), "{err}");

        let config = parse(&["--tick-ms", "2", "--epoch", "18446744073709551615"]).unwrap();
        assert_eq!(config.worker.epoch, i64::MAX);
    }

    #[test]
    fn bit_overrides_are_validated() {
        let err = parse(&["--timestamp-bits", "40"]).unwrap_err();
        assert!(err.to_string().contains("invalid ID layout"));

        let config = parse(&["--id-bits", "4", "--timestamp-bits", "42"]).unwrap();
        assert_eq!(config.layout.total_bits(), 60);
    }

    #[test]
    fn worker_id_must_fit() {
        assert!(parse(&["--preset", "ten", "--worker-id", "31"]).is_ok());
        assert!(parse(&["--preset", "ten", "--worker-id", "32"]).is_err());
        assert!(parse(&["--preset", "seven", "--worker-id", "1"]).is_err());
        assert!(parse(&["--worker-id=-1"]).is_err());
    }

    #[test]
    fn zero_counts_are_rejected() {
        assert!(parse(&["--count", "0"]).is_err());
        assert!(parse(&["--threads", "0"]).is_err());
        assert!(parse(&["--tick-ms", "0"]).is_err());
    }

    #[test]
    fn threads_never_exceed_count() {
        let config = parse(&["-n", "3", "-t", "8", "-f", "both"]).unwrap();
        assert_eq!(
            config.command,
            Command::Generate {
                count: 3,
                threads: 3,
                format: Format::Both
            }
        );
    }

    #[test]
    fn decode_skips_generation_checks() {
        let config = parse(&["--count", "0", "--decode", "abc"]).unwrap();
        assert_eq!(config.command, Command::Decode("abc".into()));
    }
}
