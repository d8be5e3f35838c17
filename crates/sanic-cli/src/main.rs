#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::{
    io::{BufWriter, Write},
    thread,
    time::Instant,
};

use anyhow::{Context, anyhow};
use clap::Parser;
use config::{CliArgs, Command, Format, RunConfig};
use sanic::{BasicWorker, LockWorker, MAX_ENCODED_LEN, Parts, WorkerConfig, decode, encode_to_buf};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    match &config.command {
        Command::Generate {
            count,
            threads,
            format,
        } => {
            let start = Instant::now();
            let ids = generate(config.worker, *count, *threads)?;
            tracing::debug!(count, threads, elapsed = ?start.elapsed(), "generated ids");
            print_ids(&ids, config.layout.display_len(), *format)
        }
        Command::Decode(s) => print_decoded(&config, s),
    }
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    } else {
        tracing::debug!(
            worker_id = config.worker.worker_id,
            total_bits = config.layout.total_bits(),
            "Starting"
        );
    }
}

/// One thread owns a [`BasicWorker`]; several threads share a [`LockWorker`].
/// The result is sorted, which for IDs from one worker is generation order.
fn generate(worker: WorkerConfig, count: usize, threads: usize) -> anyhow::Result<Vec<i64>> {
    if threads <= 1 {
        let generator = BasicWorker::new(worker)?;
        return Ok((0..count).map(|_| generator.next_id()).collect());
    }

    let generator = LockWorker::new(worker)?;
    let per_thread = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let n = count / threads + usize::from(i < count % threads);
                let generator = &generator;
                s.spawn(move || (0..n).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join())
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| anyhow!("generator thread panicked"))?;

    let mut ids: Vec<i64> = per_thread.into_iter().flatten().collect();
    ids.sort_unstable();
    Ok(ids)
}

fn print_ids(ids: &[i64], display_len: usize, format: Format) -> anyhow::Result<()> {
    let mut out = BufWriter::new(std::io::stdout().lock());
    let mut buf = [0_u8; MAX_ENCODED_LEN];
    let buf = &mut buf[..display_len];

    for &id in ids {
        match format {
            Format::Int => writeln!(out, "{id}")?,
            Format::Display => {
                encode_to_buf(id, buf);
                out.write_all(buf)?;
                out.write_all(b"\n")?;
            }
            Format::Both => {
                encode_to_buf(id, buf);
                write!(out, "{id}\t")?;
                out.write_all(buf)?;
                out.write_all(b"\n")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// A display string broken back into its fields.
#[derive(Debug, PartialEq, Eq)]
struct Decoded {
    id: i64,
    parts: Parts,
    unix_ms: i128,
}

fn decode_fields(config: &RunConfig, s: &str) -> anyhow::Result<Decoded> {
    let id = decode(s).with_context(|| format!("cannot decode {s:?}"))?;
    if s.len() != config.layout.display_len() {
        tracing::warn!(
            len = s.len(),
            expected = config.layout.display_len(),
            "string length does not match the configured layout"
        );
    }

    let parts = config.layout.decompose(id);
    let tick = parts.tick(config.worker.epoch).with_context(|| {
        format!(
            "timestamp {} overflows past epoch {}",
            parts.timestamp, config.worker.epoch
        )
    })?;
    let unix_ms = i128::try_from(config.worker.tick.as_nanos())
        .ok()
        .and_then(|tick_nanos| i128::from(tick).checked_mul(tick_nanos))
        .map(|nanos| nanos / 1_000_000)
        .with_context(|| format!("tick {tick} does not convert to Unix time"))?;

    Ok(Decoded { id, parts, unix_ms })
}

fn print_decoded(config: &RunConfig, s: &str) -> anyhow::Result<()> {
    let Decoded { id, parts, unix_ms } = decode_fields(config, s)?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "id:        {id}")?;
    writeln!(out, "timestamp: {}", parts.timestamp)?;
    writeln!(out, "worker_id: {}", parts.worker_id)?;
    writeln!(out, "sequence:  {}", parts.sequence)?;
    writeln!(out, "unix_ms:   {unix_ms}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanic::encode;

    fn run_config(args: &[&str]) -> RunConfig {
        let args = CliArgs::try_parse_from(core::iter::once("sanic").chain(args.iter().copied()))
            .unwrap();
        RunConfig::try_from(args).unwrap()
    }

    #[test]
    fn decodes_fields_and_wall_time() {
        let config = run_config(&[]);
        let id = config.layout.compose(1_000, 3, 7);
        let s = encode(id, config.layout.total_bits()).unwrap();

        let decoded = decode_fields(&config, &s).unwrap();
        assert_eq!(decoded.id, id);
        assert_eq!(
            decoded.parts,
            Parts {
                timestamp: 1_000,
                worker_id: 3,
                sequence: 7
            }
        );
        assert_eq!(decoded.unix_ms, 1_451_606_401_000);
    }

    #[test]
    fn coarse_ticks_scale_wall_time() {
        let config = run_config(&["--preset", "seven", "--epoch", "0"]);
        let id = config.layout.compose(2, 0, 0);
        let s = encode(id, config.layout.total_bits()).unwrap();
        assert_eq!(decode_fields(&config, &s).unwrap().unix_ms, 2_000);
    }

    #[test]
    fn tick_overflow_is_an_error() {
        let config = run_config(&["--tick-ms", "2", "--epoch", "18446744073709551615"]);
        assert_eq!(config.worker.epoch, i64::MAX);

        let err = decode_fields(&config, "0---------").unwrap_err();
        assert!(err.to_string().contains("overflows"), "{err}");
    }

    #[test]
    fn invalid_strings_are_errors() {
        let config = run_config(&[]);
        assert!(decode_fields(&config, "").is_err());
        assert!(decode_fields(&config, "not*valid").is_err());
    }
}
