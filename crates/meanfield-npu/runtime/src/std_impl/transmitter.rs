// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Host transmitters

use crate::traits::{OutboundEvent, Transmitter};
use parking_lot::Mutex;

/// Keeps every sent event, in send order
#[derive(Debug, Default)]
pub struct CollectingTransmitter {
    events: Mutex<Vec<OutboundEvent>>,
}

impl CollectingTransmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all collected events
    pub fn drain(&self) -> Vec<OutboundEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Transmitter for CollectingTransmitter {
    fn send(&self, event: OutboundEvent) {
        self.events.lock().push(event);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransmitter;

impl Transmitter for NullTransmitter {
    fn send(&self, _event: OutboundEvent) {}
}
