// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host-side wiring: configuration → services → initialized core
//!
//! Used by the tools and by hosts embedding a core in a larger process.

use std::path::Path;

use anyhow::{Context, Result};
use meanfield_config::{CoreConfig, MeanfieldConfig};
use meanfield_npu_neural::Accum;
use meanfield_npu_runtime::{SharedRegion, StdWorkingMemory};
use meanfield_npu_tick_engine::{CoreServices, DynamicCore};
use tracing::info;

/// Apply the core section to a set of services
///
/// Sets the working-memory budget and the model timestep; recorder and transmitter are kept.
pub fn configure_services(core: &CoreConfig, services: CoreServices) -> CoreServices {
    let memory = match core.memory_limit() {
        Some(limit) => StdWorkingMemory::with_limit(limit),
        None => StdWorkingMemory::new(),
    };
    services
        .with_memory(memory)
        .with_timestep(Accum::from_f64(core.timestep_ms))
}

/// Build the configured model's core and initialize it from `blob`
pub fn start_core(
    config: &MeanfieldConfig,
    blob: SharedRegion,
    services: CoreServices,
) -> meanfield_npu_tick_engine::Result<DynamicCore> {
    let mut core = DynamicCore::new(config.core.model, configure_services(&config.core, services));
    let target = core.resolve_recording(
        &config.recording.variables,
        config.recording.sampling_interval,
        config.recording.frame_capacity,
    )?;
    core.initialize(blob, &target)?;
    info!(
        target: "meanfield",
        "Core ready: model {}, {} units, recording {:?}",
        config.core.model,
        core.unit_count(),
        config.recording.variables
    );
    Ok(core)
}

/// Read a blob file of little-endian 32-bit words
pub fn read_blob_file(path: &Path) -> Result<SharedRegion> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read blob file {}", path.display()))?;
    SharedRegion::from_le_bytes(&bytes)
        .with_context(|| format!("Blob file {} is not a word image", path.display()))
}

/// Write a region back to a blob file
pub fn write_blob_file(path: &Path, region: &SharedRegion) -> Result<()> {
    std::fs::write(path, region.to_le_bytes())
        .with_context(|| format!("Failed to write blob file {}", path.display()))
}
