// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-unit parameter storage
//!
//! A `UnitParameterSet` is the working-memory copy of every unit's model record. Records are
//! plain-old-data, so they move to and from the external parameter words by casting rather
//! than field-by-field decoding. That keeps the byte layout identical across a store/load
//! round trip.

use super::error::{NeuralError, Result};
use crate::models::UnitParameters;

/// Working-memory array of unit records, indexed by unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitParameterSet<P> {
    units: Vec<P>,
}

impl<P: UnitParameters> UnitParameterSet<P> {
    /// Wrap already-built records
    pub fn from_units(units: Vec<P>) -> Self {
        Self { units }
    }

    /// Number of 32-bit words occupied by `unit_count` records
    pub fn words_for(unit_count: usize) -> usize {
        unit_count * P::WORDS
    }

    /// Number of working-memory bytes occupied by `unit_count` records
    pub fn bytes_for(unit_count: usize) -> usize {
        unit_count * core::mem::size_of::<P>()
    }

    /// Decode `unit_count` records from the front of `words`
    pub fn read_from(words: &[u32], unit_count: usize) -> Result<Self> {
        let needed = Self::words_for(unit_count);
        if words.len() < needed {
            return Err(NeuralError::TruncatedParameters {
                units: unit_count,
                expected: needed,
                actual: words.len(),
            });
        }
        let records: &[P] = bytemuck::try_cast_slice(&words[..needed]).map_err(|_| {
            NeuralError::UnalignedRecord {
                size: core::mem::size_of::<P>(),
            }
        })?;
        Ok(Self {
            units: records.to_vec(),
        })
    }

    /// Records viewed as their external word encoding
    pub fn as_words(&self) -> Result<&[u32]> {
        bytemuck::try_cast_slice(&self.units).map_err(|_| NeuralError::UnalignedRecord {
            size: core::mem::size_of::<P>(),
        })
    }

    /// Encode all records into the front of `words`, byte for byte
    pub fn write_to(&self, words: &mut [u32]) -> Result<()> {
        let encoded = self.as_words()?;
        if words.len() < encoded.len() {
            return Err(NeuralError::TruncatedParameters {
                units: self.units.len(),
                expected: encoded.len(),
                actual: words.len(),
            });
        }
        words[..encoded.len()].copy_from_slice(encoded);
        Ok(())
    }

    /// Check every record with the model's own validation rules
    pub fn validate(&self) -> Result<()> {
        for (unit, params) in self.units.iter().enumerate() {
            params
                .validate()
                .map_err(|reason| NeuralError::InvalidParameters { unit, reason })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, unit: usize) -> Option<&P> {
        self.units.get(unit)
    }

    pub fn as_slice(&self) -> &[P] {
        &self.units
    }

    pub fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.units
    }

    pub fn iter(&self) -> core::slice::Iter<'_, P> {
        self.units.iter()
    }
}
