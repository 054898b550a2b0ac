// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Outbound event transmission

use meanfield_npu_neural::Accum;

/// One outbound event as handed to the event fabric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundEvent {
    /// Routing key (`routing_key | unit`)
    pub key: u32,
    /// Raw payload (unit output bits)
    pub payload: u32,
    /// Offset within the tick at which the event may leave the core (TDMA)
    pub send_offset: u32,
}

impl OutboundEvent {
    pub fn new(key: u32, output: Accum, send_offset: u32) -> Self {
        Self {
            key,
            payload: output.to_bits() as u32,
            send_offset,
        }
    }

    /// Payload reinterpreted as a fixed-point value
    pub fn value(&self) -> Accum {
        Accum::from_bits(self.payload as i32)
    }
}

/// Event fabric endpoint
pub trait Transmitter: Send + Sync {
    fn send(&self, event: OutboundEvent);
}
