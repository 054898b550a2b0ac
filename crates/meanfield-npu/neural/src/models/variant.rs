// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Model variant selector

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// Unit model hosted by a core, chosen once at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum ModelVariant {
    #[default]
    MeanField,
    LinearRate,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::MeanField, ModelVariant::LinearRate];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::MeanField => "mean_field",
            ModelVariant::LinearRate => "linear_rate",
        }
    }

    /// Words per unit record for this variant
    pub fn record_words(&self) -> usize {
        use super::traits::UnitParameters;
        match self {
            ModelVariant::MeanField => super::MeanFieldParameters::WORDS,
            ModelVariant::LinearRate => super::LinearRateParameters::WORDS,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized model name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model variant '{0}' (expected mean_field or linear_rate)")]
pub struct UnknownModelVariant(pub String);

impl FromStr for ModelVariant {
    type Err = UnknownModelVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mean_field" | "meanfield" => Ok(ModelVariant::MeanField),
            "linear_rate" | "linear" => Ok(ModelVariant::LinearRate),
            _ => Err(UnknownModelVariant(s.to_string())),
        }
    }
}
