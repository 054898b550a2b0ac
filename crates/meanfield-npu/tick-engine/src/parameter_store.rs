// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Parameter Store
//!
//! Moves unit records between the external parameter blob and working memory.
//!
//! ## Blob Layout (little-endian 32-bit words)
//!
//! ```text
//! [0..3)   TDMA: time_between_sends, initial_offset, phase_count
//! [3]      has_key (0 = core does not transmit)
//! [4]      routing_key
//! [5]      unit_count
//! [6]      unit_count_padded (power of two >= unit_count)
//! [7]      class_count
//! [8..8+c) scaling exponent per event class
//! [...]    unit records, unit_count × Parameters::WORDS
//! ```
//!
//! The store remembers where the unit array starts and writes back exactly there, so a
//! `store` followed by a `load` reconstructs identical records.

use crate::error::{CoreError, Result};
use crate::fatal::{halt, FatalError};
use crate::tdma::TdmaSchedule;
use meanfield_npu_neural::{padded_unit_count, NeuralError, UnitParameterSet, UnitParameters};
use meanfield_npu_runtime::SharedRegion;
use serde::Serialize;
use tracing::debug;

/// Words before the scaling table
pub const HEADER_WORDS: usize = TdmaSchedule::WORDS + 5;

/// Routing key and whether the core may transmit at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TransmissionIdentity {
    pub has_key: bool,
    pub key: u32,
}

impl TransmissionIdentity {
    pub fn new(key: u32) -> Self {
        Self { has_key: true, key }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    /// Outbound key for a unit, if the core transmits
    #[inline]
    pub fn key_for(&self, unit: usize) -> Option<u32> {
        self.has_key.then(|| self.key | unit as u32)
    }
}

/// Decoded fixed header of a parameter blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobHeader {
    pub tdma: TdmaSchedule,
    pub identity: TransmissionIdentity,
    pub unit_count: usize,
    pub unit_count_padded: usize,
    pub class_count: usize,
    /// Word offset of the unit array
    pub params_offset: usize,
}

impl BlobHeader {
    /// Parse and check the header. Does not look at the unit array.
    pub fn parse(words: &[u32]) -> Result<Self> {
        if words.len() < HEADER_WORDS {
            return Err(CoreError::InvalidBlob(format!(
                "{} words is shorter than the {}-word header",
                words.len(),
                HEADER_WORDS
            )));
        }
        let tdma = TdmaSchedule::from_words([words[0], words[1], words[2]]);
        let identity = TransmissionIdentity {
            has_key: words[3] != 0,
            key: words[4],
        };
        let unit_count = words[5] as usize;
        let unit_count_padded = words[6] as usize;
        let class_count = words[7] as usize;

        if !unit_count_padded.is_power_of_two() || unit_count_padded < unit_count {
            return Err(CoreError::InvalidBlob(format!(
                "padded unit count {} is not a power of two >= unit count {}",
                unit_count_padded, unit_count
            )));
        }

        let params_offset = HEADER_WORDS + class_count;
        if words.len() < params_offset {
            return Err(CoreError::InvalidBlob(format!(
                "{} words cannot hold {} scaling exponents",
                words.len(),
                class_count
            )));
        }

        Ok(Self {
            tdma,
            identity,
            unit_count,
            unit_count_padded,
            class_count,
            params_offset,
        })
    }

    /// Scaling exponents, one per class
    pub fn scaling_exponents<'a>(&self, words: &'a [u32]) -> &'a [u32] {
        &words[HEADER_WORDS..self.params_offset]
    }
}

/// Load/store endpoint bound to one blob
#[derive(Debug, Clone)]
pub struct ParameterStore {
    region: SharedRegion,
    params_offset: usize,
    unit_count: usize,
}

impl ParameterStore {
    pub fn new(region: SharedRegion, header: &BlobHeader) -> Self {
        Self {
            region,
            params_offset: header.params_offset,
            unit_count: header.unit_count,
        }
    }

    pub fn region(&self) -> &SharedRegion {
        &self.region
    }

    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    /// Check the blob holds the declared unit array without reading it
    pub fn check_unit_array<P: UnitParameters>(&self) -> Result<()> {
        Self::fits::<P>(self.region.len(), self.params_offset, self.unit_count)
    }

    fn fits<P: UnitParameters>(total_words: usize, params_offset: usize, unit_count: usize) -> Result<()> {
        let available = total_words.saturating_sub(params_offset);
        let needed = UnitParameterSet::<P>::words_for(unit_count);
        if available < needed {
            return Err(CoreError::InvalidBlob(format!(
                "unit array needs {} words for {} units, blob has {}",
                needed, unit_count, available
            )));
        }
        Ok(())
    }

    /// Read and validate every unit record
    pub fn load<P: UnitParameters>(&self) -> Result<UnitParameterSet<P>> {
        let words = self.region.read();
        Self::fits::<P>(words.len(), self.params_offset, self.unit_count)?;
        let set = UnitParameterSet::<P>::read_from(&words[self.params_offset..], self.unit_count)?;
        set.validate()?;
        debug!(target: "meanfield-tick-engine", "[STORE] Loaded {} unit records from word {}", self.unit_count, self.params_offset);
        Ok(set)
    }

    /// Write every unit record back where it was loaded from. Failure halts the core.
    pub fn store<P: UnitParameters>(&self, set: &UnitParameterSet<P>) {
        let mut words = self.region.write();
        let available = words.len().saturating_sub(self.params_offset);
        let result = match words.get_mut(self.params_offset..) {
            Some(target) => set.write_to(target),
            None => Err(NeuralError::TruncatedParameters {
                units: set.len(),
                expected: UnitParameterSet::<P>::words_for(set.len()),
                actual: available,
            }),
        };
        if let Err(e) = result {
            drop(words);
            halt(FatalError::StoreFailed(e.to_string()));
        }
        debug!(target: "meanfield-tick-engine", "[STORE] Stored {} unit records at word {}", set.len(), self.params_offset);
    }
}

/// Assembles a parameter blob (hosts, tools and tests)
#[derive(Debug, Clone)]
pub struct BlobBuilder<P> {
    tdma: TdmaSchedule,
    identity: TransmissionIdentity,
    scaling_exponents: Vec<u32>,
    units: UnitParameterSet<P>,
    unit_count_padded: Option<usize>,
}

impl<P: UnitParameters> BlobBuilder<P> {
    pub fn new(units: Vec<P>) -> Self {
        Self {
            tdma: TdmaSchedule::default(),
            identity: TransmissionIdentity::silent(),
            scaling_exponents: Vec::new(),
            units: UnitParameterSet::from_units(units),
            unit_count_padded: None,
        }
    }

    pub fn tdma(mut self, tdma: TdmaSchedule) -> Self {
        self.tdma = tdma;
        self
    }

    pub fn routing_key(mut self, key: u32) -> Self {
        self.identity = TransmissionIdentity::new(key);
        self
    }

    /// One exponent per event class; the class count follows from the length
    pub fn scaling_exponents(mut self, exponents: Vec<u32>) -> Self {
        self.scaling_exponents = exponents;
        self
    }

    /// Override the padded unit count written to the header
    pub fn unit_count_padded(mut self, padded: usize) -> Self {
        self.unit_count_padded = Some(padded);
        self
    }

    /// Encode the blob
    pub fn build(&self) -> Result<Vec<u32>> {
        let unit_count = self.units.len();
        let padded = self
            .unit_count_padded
            .unwrap_or_else(|| padded_unit_count(unit_count));

        let mut words = Vec::with_capacity(
            HEADER_WORDS + self.scaling_exponents.len() + UnitParameterSet::<P>::words_for(unit_count),
        );
        words.extend_from_slice(&self.tdma.to_words());
        words.push(self.identity.has_key as u32);
        words.push(self.identity.key);
        words.push(unit_count as u32);
        words.push(padded as u32);
        words.push(self.scaling_exponents.len() as u32);
        words.extend_from_slice(&self.scaling_exponents);
        words.extend_from_slice(self.units.as_words()?);
        Ok(words)
    }

    pub fn build_region(&self) -> Result<SharedRegion> {
        self.build().map(SharedRegion::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meanfield_npu_neural::{Accum, MeanFieldParameters};

    fn units(n: i16) -> Vec<MeanFieldParameters> {
        (0..n)
            .map(|i| MeanFieldParameters {
                drive: Accum::from_int(i),
                ..MeanFieldParameters::default()
            })
            .collect()
    }

    #[test]
    fn test_parse_header() {
        let words = BlobBuilder::new(units(3))
            .tdma(TdmaSchedule::from_words([10, 2, 4]))
            .routing_key(0x800)
            .scaling_exponents(vec![2, 5])
            .build().unwrap();
        let header = BlobHeader::parse(&words).unwrap();

        assert_eq!(header.tdma.time_between_sends, 10);
        assert_eq!(header.identity, TransmissionIdentity::new(0x800));
        assert_eq!(header.unit_count, 3);
        assert_eq!(header.unit_count_padded, 4);
        assert_eq!(header.class_count, 2);
        assert_eq!(header.params_offset, HEADER_WORDS + 2);
        assert_eq!(header.scaling_exponents(&words), &[2, 5]);
    }

    #[test]
    fn test_parse_rejects_bad_padding() {
        let words = BlobBuilder::new(units(3)).unit_count_padded(3).build().unwrap();
        assert!(matches!(BlobHeader::parse(&words), Err(CoreError::InvalidBlob(_))));

        let words = BlobBuilder::new(units(5)).unit_count_padded(4).build().unwrap();
        assert!(matches!(BlobHeader::parse(&words), Err(CoreError::InvalidBlob(_))));
    }

    #[test]
    fn test_parse_rejects_truncated_header() {
        let words = BlobBuilder::new(units(1)).scaling_exponents(vec![1, 1, 1]).build().unwrap();
        assert!(BlobHeader::parse(&words[..4]).is_err());
        assert!(BlobHeader::parse(&words[..HEADER_WORDS + 1]).is_err());
    }

    #[test]
    fn test_key_for_unit() {
        assert_eq!(TransmissionIdentity::new(0x100).key_for(5), Some(0x105));
        assert_eq!(TransmissionIdentity::silent().key_for(5), None);
    }

    #[test]
    fn test_store_then_load_is_identical() {
        let region = BlobBuilder::new(units(3)).scaling_exponents(vec![1]).build_region().unwrap();
        let header = BlobHeader::parse(&region.read()).unwrap();
        let store = ParameterStore::new(region.clone(), &header);

        let mut set = store.load::<MeanFieldParameters>().unwrap();
        set.as_mut_slice()[1].rate = Accum::from_f32(3.75);
        let before = region.snapshot();
        store.store(&set);

        let after = region.snapshot();
        assert_eq!(&after[..header.params_offset], &before[..header.params_offset]);
        assert_eq!(store.load::<MeanFieldParameters>().unwrap(), set);
    }

    #[test]
    fn test_load_truncated_unit_array() {
        let mut words = BlobBuilder::new(units(3)).build().unwrap();
        words.pop();
        let header = BlobHeader::parse(&words).unwrap();
        let store = ParameterStore::new(SharedRegion::new(words), &header);
        assert!(matches!(
            store.load::<MeanFieldParameters>(),
            Err(CoreError::InvalidBlob(_))
        ));
    }

    #[test]
    fn test_check_unit_array_catches_inflated_count() {
        let mut words = BlobBuilder::new(units(2)).build().unwrap();
        words[5] = 1_000_000;
        words[6] = 1 << 20;
        let header = BlobHeader::parse(&words).unwrap();
        let store = ParameterStore::new(SharedRegion::new(words), &header);
        assert!(matches!(
            store.check_unit_array::<MeanFieldParameters>(),
            Err(CoreError::InvalidBlob(_))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_records() {
        let mut bad = units(2);
        bad[1].tau = Accum::from_int(-5);
        let region = BlobBuilder::new(bad).build_region().unwrap();
        let header = BlobHeader::parse(&region.read()).unwrap();
        let store = ParameterStore::new(region, &header);
        assert!(matches!(
            store.load::<MeanFieldParameters>(),
            Err(CoreError::InvalidParameters(_))
        ));
    }

    #[test]
    #[should_panic(expected = "parameter store failed")]
    fn test_store_into_short_region_halts() {
        let region = BlobBuilder::new(units(2)).build_region().unwrap();
        let header = BlobHeader::parse(&region.read()).unwrap();
        let store = ParameterStore::new(region.clone(), &header);
        let set = store.load::<MeanFieldParameters>().unwrap();
        region.write().truncate(header.params_offset + 3);
        store.store(&set);
    }
}
