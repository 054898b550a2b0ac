// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tick statistics

use crate::aggregation::DrainReport;
use serde::Serialize;

/// Counters accumulated by a controller over its lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub ticks: u64,
    pub inputs_delivered: u64,
    pub padding_skipped: u64,
    /// Non-zero padding slots cleared without delivery
    pub padding_discarded: u64,
    pub transmissions: u64,
    /// Earliest send offset within a tick seen so far
    pub earliest_send_offset: Option<u32>,
    /// Latest send offset within a tick seen so far
    pub latest_send_offset: Option<u32>,
    /// Ticks whose processing exceeded the tick period (tick loop runner only)
    pub overruns: u64,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_drain(&mut self, report: &DrainReport) {
        self.inputs_delivered += report.inputs_delivered as u64;
        self.padding_skipped += report.padding_skipped as u64;
        self.padding_discarded += report.padding_discarded as u64;
    }

    pub fn record_send(&mut self, offset: u32) {
        self.transmissions += 1;
        self.earliest_send_offset = Some(self.earliest_send_offset.map_or(offset, |e| e.min(offset)));
        self.latest_send_offset = Some(self.latest_send_offset.map_or(offset, |l| l.max(offset)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_offsets_track_extremes() {
        let mut stats = TickStats::new();
        stats.record_send(7);
        stats.record_send(2);
        stats.record_send(9);
        assert_eq!(stats.transmissions, 3);
        assert_eq!(stats.earliest_send_offset, Some(2));
        assert_eq!(stats.latest_send_offset, Some(9));
    }

    #[test]
    fn test_record_drain() {
        let mut stats = TickStats::new();
        let report = DrainReport {
            slots_visited: 8,
            inputs_delivered: 2,
            padding_skipped: 2,
            padding_discarded: 1,
        };
        stats.record_drain(&report);
        stats.record_drain(&report);
        assert_eq!(stats.inputs_delivered, 4);
        assert_eq!(stats.padding_skipped, 4);
        assert_eq!(stats.padding_discarded, 2);
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_value(TickStats::new()).unwrap();
        assert_eq!(json["ticks"], 0);
        assert!(json["earliest_send_offset"].is_null());
    }
}
