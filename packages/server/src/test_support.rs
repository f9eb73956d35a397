//! Sinks shared by unit tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::domain::{ConnectionSink, DeliveryFailure, OutboundEvent};

/// Sink that records every delivered event; clones share the same record.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    events: Arc<Mutex<Vec<OutboundEvent>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<OutboundEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Option<OutboundEvent> {
        self.events.lock().unwrap().last().cloned()
    }

    /// Make every later delivery fail, as if the peer went away
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl ConnectionSink for RecordingSink {
    fn deliver(&self, event: &OutboundEvent) -> Result<(), DeliveryFailure> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DeliveryFailure::ChannelClosed);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sink whose every delivery fails
#[derive(Debug, Clone, Copy)]
pub(crate) struct FailingSink;

impl ConnectionSink for FailingSink {
    fn deliver(&self, _event: &OutboundEvent) -> Result<(), DeliveryFailure> {
        Err(DeliveryFailure::ChannelClosed)
    }
}
