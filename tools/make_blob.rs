// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Write a parameter blob with default unit records.
//!
//! The output is the word image `run_core --blob` reads: TDMA schedule, header, scaling
//! exponents, then one record per unit, as little-endian 32-bit words.

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use meanfield::neural::{LinearRateParameters, MeanFieldParameters, ModelVariant};
use meanfield::tick_engine::{BlobBuilder, TdmaSchedule};

struct Args {
    model: ModelVariant,
    units: usize,
    classes: usize,
    shift: u32,
    key: Option<u32>,
    tdma: TdmaSchedule,
    out: PathBuf,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: make_blob --out <path> [--model mean_field|linear_rate] [--units <n>]\n\
         \x20                [--classes <n>] [--shift <n>] [--key <hex>] [--tdma <spacing>:<offset>:<phases>]\n\n\
         Defaults:\n\
         - model: mean_field\n\
         - units: 16, classes: 2, shift: 0\n\
         - key: none (core does not transmit)\n"
    );
    process::exit(2);
}

fn parse_key(raw: &str) -> Result<u32> {
    let digits = raw.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).with_context(|| format!("--key {raw}"))
}

fn parse_tdma(raw: &str) -> Result<TdmaSchedule> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 3 {
        anyhow::bail!("Expected <spacing>:<offset>:<phases>, got '{raw}'");
    }
    Ok(TdmaSchedule {
        time_between_sends: parts[0].parse().context("spacing")?,
        initial_offset: parts[1].parse().context("offset")?,
        phase_count: parts[2].parse().context("phases")?,
    })
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        model: ModelVariant::default(),
        units: 16,
        classes: 2,
        shift: 0,
        key: None,
        tdma: TdmaSchedule::default(),
        out: PathBuf::new(),
    };
    let mut have_out = false;

    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().unwrap_or_else(|| usage_and_exit());
        match arg.as_str() {
            "--model" => args.model = value().parse().map_err(anyhow::Error::msg)?,
            "--units" => args.units = value().parse().context("--units")?,
            "--classes" => args.classes = value().parse().context("--classes")?,
            "--shift" => args.shift = value().parse().context("--shift")?,
            "--key" => args.key = Some(parse_key(&value())?),
            "--tdma" => args.tdma = parse_tdma(&value())?,
            "--out" => {
                args.out = PathBuf::from(value());
                have_out = true;
            }
            "-h" | "--help" => usage_and_exit(),
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    if !have_out {
        usage_and_exit();
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let exponents = vec![args.shift; args.classes];

    let region = match args.model {
        ModelVariant::MeanField => {
            let mut builder = BlobBuilder::new(vec![MeanFieldParameters::default(); args.units])
                .scaling_exponents(exponents)
                .tdma(args.tdma);
            if let Some(key) = args.key {
                builder = builder.routing_key(key);
            }
            builder.build_region()?
        }
        ModelVariant::LinearRate => {
            let mut builder = BlobBuilder::new(vec![LinearRateParameters::default(); args.units])
                .scaling_exponents(exponents)
                .tdma(args.tdma);
            if let Some(key) = args.key {
                builder = builder.routing_key(key);
            }
            builder.build_region()?
        }
    };

    meanfield::host::write_blob_file(&args.out, &region)?;
    println!(
        "Wrote {} blob: {} units, {} classes, {} words -> {}",
        args.model,
        args.units,
        args.classes,
        region.len(),
        args.out.display()
    );
    Ok(())
}
