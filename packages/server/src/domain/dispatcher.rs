//! Fan-out delivery with per-connection failure isolation.

use std::sync::Arc;

use super::{
    error::DeliveryFailure,
    event::OutboundEvent,
    registry::{ConnectionRegistry, Visit},
    value_object::ConnectionId,
};

/// Single place every delivery failure is reported to.
///
/// Called once per failed connection, before it is unregistered.
#[cfg_attr(test, mockall::automock)]
pub trait DeliveryFailureHook: Send + Sync {
    fn on_delivery_failure(&self, connection_id: &ConnectionId, failure: &DeliveryFailure);
}

/// Failure hook that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureHook;

impl DeliveryFailureHook for TracingFailureHook {
    fn on_delivery_failure(&self, connection_id: &ConnectionId, failure: &DeliveryFailure) {
        tracing::warn!(
            connection_id = %connection_id,
            error = %failure,
            "Delivery failed, dropping connection"
        );
    }
}

/// Delivers events to registered connections.
///
/// A connection whose delivery fails is reported to the hook and
/// unregistered; delivery to the remaining connections continues and the
/// failed one is not retried.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    hook: Arc<dyn DeliveryFailureHook>,
}

impl BroadcastDispatcher {
    pub fn new(hook: Arc<dyn DeliveryFailureHook>) -> Self {
        Self { hook }
    }

    /// Deliver `event` to every registered connection.
    ///
    /// Returns the number of successful deliveries.
    pub fn broadcast(&self, event: &OutboundEvent, registry: &mut ConnectionRegistry) -> usize {
        let mut delivered = 0;
        registry.for_each(|connection| match connection.send(event) {
            Ok(()) => {
                delivered += 1;
                Visit::Keep
            }
            Err(failure) => {
                self.hook.on_delivery_failure(connection.id(), &failure);
                Visit::Remove
            }
        });
        delivered
    }

    /// Deliver `event` to one connection under the same failure policy.
    ///
    /// Returns `false` if the connection is not registered or the delivery
    /// failed (in which case it has been unregistered).
    pub fn deliver_to(
        &self,
        connection_id: &ConnectionId,
        event: &OutboundEvent,
        registry: &mut ConnectionRegistry,
    ) -> bool {
        let Some(connection) = registry.get(connection_id) else {
            return false;
        };
        match connection.send(event) {
            Ok(()) => true,
            Err(failure) => {
                self.hook.on_delivery_failure(connection_id, &failure);
                registry.unregister(connection_id);
                false
            }
        }
    }
}

impl Default for BroadcastDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(TracingFailureHook))
    }
}
