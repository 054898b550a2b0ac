// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Run a core from a configuration file and a parameter blob.
//!
//! Deposits the `--inject` weights before every tick, runs `--ticks` ticks (or drives the
//! core from the tick loop runner with `--realtime`), pauses, optionally writes the parameter
//! blob back, and prints a JSON summary to stdout.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use meanfield::config::{load_config, MeanfieldConfig};
use meanfield::observability::{init_logging, CrateDebugFlags};
use meanfield::runtime::{FrameRecorder, SharedSink};
use meanfield::tick_engine::{CoreServices, DynamicCore, TickLoopRunner};
use parking_lot::Mutex;
use serde_json::json;
use tracing::info;

struct Args {
    config: Option<PathBuf>,
    blob: PathBuf,
    ticks: u32,
    realtime: bool,
    injections: Vec<(usize, usize, u32)>,
    write_back: Option<PathBuf>,
    overrides: HashMap<String, String>,
    debug: CrateDebugFlags,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: run_core --blob <path> [--config <path>] [--ticks <n>] [--realtime]\n\
         \x20               [--inject <class>:<unit>:<weight>]... [--write-back <path>]\n\
         \x20               [--set <key>=<value>]... [--debug-<crate>] [--debug-all]\n\n\
         Defaults:\n\
         - ticks: 100\n\
         - config: searched from MEANFIELD_CONFIG_PATH and the working directory, else built-in defaults\n"
    );
    process::exit(2);
}

fn parse_injection(raw: &str) -> Result<(usize, usize, u32)> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        bail!("Expected <class>:<unit>:<weight>, got '{raw}'");
    }
    Ok((
        parts[0].parse().context("class")?,
        parts[1].parse().context("unit")?,
        parts[2].parse().context("weight")?,
    ))
}

fn parse_args() -> Result<Args> {
    let raw: Vec<String> = env::args().skip(1).collect();
    let mut args = Args {
        config: None,
        blob: PathBuf::new(),
        ticks: 100,
        realtime: false,
        injections: Vec::new(),
        write_back: None,
        overrides: HashMap::new(),
        debug: CrateDebugFlags::from_args(raw.iter().cloned()),
    };
    let mut have_blob = false;

    let mut it = raw.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(it.next().unwrap_or_else(|| usage_and_exit()))),
            "--blob" => {
                args.blob = PathBuf::from(it.next().unwrap_or_else(|| usage_and_exit()));
                have_blob = true;
            }
            "--ticks" => {
                let v = it.next().unwrap_or_else(|| usage_and_exit());
                args.ticks = v.parse().with_context(|| format!("--ticks {v}"))?;
            }
            "--realtime" => args.realtime = true,
            "--inject" => {
                let v = it.next().unwrap_or_else(|| usage_and_exit());
                args.injections.push(parse_injection(&v)?);
            }
            "--write-back" => {
                args.write_back = Some(PathBuf::from(it.next().unwrap_or_else(|| usage_and_exit())))
            }
            "--set" => {
                let v = it.next().unwrap_or_else(|| usage_and_exit());
                let (key, value) = v
                    .split_once('=')
                    .with_context(|| format!("--set expects key=value, got '{v}'"))?;
                args.overrides.insert(key.to_string(), value.to_string());
            }
            "-h" | "--help" => usage_and_exit(),
            flag if flag.starts_with("--debug") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    if !have_blob {
        usage_and_exit();
    }
    Ok(args)
}

fn resolve_config(args: &Args) -> Result<MeanfieldConfig> {
    match &args.config {
        Some(path) => Ok(load_config(Some(path), Some(&args.overrides))?),
        None => match load_config(None, Some(&args.overrides)) {
            Ok(config) => Ok(config),
            Err(meanfield::config::ConfigError::FileNotFound(_)) => {
                let mut config = MeanfieldConfig::default();
                meanfield::config::apply_environment_overrides(&mut config)?;
                meanfield::config::apply_cli_overrides(&mut config, &args.overrides)?;
                meanfield::config::validate_config(&config)?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        },
    }
}

fn inject(core: &DynamicCore, injections: &[(usize, usize, u32)]) -> Result<()> {
    let Some(ring) = core.ring_buffer() else {
        return Ok(());
    };
    for &(class, unit, weight) in injections {
        ring.deposit(class, unit, weight)
            .with_context(|| format!("inject {class}:{unit}:{weight}"))?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = parse_args()?;
    let config = resolve_config(&args)?;

    let mut debug = args.debug.clone();
    for name in &config.logging.debug_crates {
        debug.enable(name);
    }
    init_logging(&config.logging.level, &debug)?;

    let blob = meanfield::host::read_blob_file(&args.blob)?;
    let frames: SharedSink<FrameRecorder> = Arc::new(Mutex::new(FrameRecorder::new()));
    let services = CoreServices::host().with_recorder(frames.clone());
    let mut core = meanfield::host::start_core(&config, blob.clone(), services)?;

    if args.realtime {
        // Injections are deposited once up front; the runner owns the tick cadence
        inject(&core, &args.injections)?;
        let shared = Arc::new(Mutex::new(core));
        let mut runner = TickLoopRunner::new(shared.clone(), config.core.tick_period())
            .with_max_ticks(u64::from(args.ticks));
        runner.start().map_err(anyhow::Error::msg)?;
        runner.join();
        info!(target: "meanfield", "Runner finished after {} ticks ({} overruns)", runner.tick_count(), runner.overruns());
        drop(runner);
        core = match Arc::try_unwrap(shared) {
            Ok(mutex) => mutex.into_inner(),
            Err(_) => bail!("Tick loop runner still holds the core"),
        };
    } else {
        for tick in 0..args.ticks {
            inject(&core, &args.injections)?;
            core.on_tick(tick)?;
        }
    }

    core.pause()?;
    if let Some(path) = &args.write_back {
        meanfield::host::write_blob_file(path, &blob)?;
        info!(target: "meanfield", "Wrote parameters back to {}", path.display());
    }

    let recorder = frames.lock();
    let summary = json!({
        "model": config.core.model.to_string(),
        "state": core.state().to_string(),
        "time": core.time(),
        "units": core.unit_count(),
        "stats": core.stats(),
        "recorded_variables": core.recorded_variables(),
        "frames": recorder.frames().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("run_core: {e:#}");
        process::exit(1);
    }
}
