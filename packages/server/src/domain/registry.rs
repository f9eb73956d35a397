//! Registry of currently attached connections.

use std::collections::HashMap;

use super::{
    connection::{Connection, ConnectionSummary},
    error::DuplicateIdError,
    value_object::ConnectionId,
};

/// Decision returned by a [`ConnectionRegistry::for_each`] visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Keep,
    /// Unregister the connection that was just visited
    Remove,
}

/// Connections keyed by id, iterated in registration order.
///
/// Every entry is live. A connection found dead is removed, never kept with a
/// flag.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
    /// Registration order of the keys in `connections`
    order: Vec<ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateIdError`] if the id is already registered. The
    /// registry is left untouched in that case.
    pub fn register(&mut self, connection: Connection) -> Result<(), DuplicateIdError> {
        if self.connections.contains_key(connection.id()) {
            return Err(DuplicateIdError(connection.id().clone()));
        }
        let id = connection.id().clone();
        self.order.push(id.clone());
        self.connections.insert(id, connection);
        Ok(())
    }

    /// Remove a connection; a missing id is a no-op.
    pub fn unregister(&mut self, id: &ConnectionId) -> Option<Connection> {
        let removed = self.connections.remove(id)?;
        self.order.retain(|registered| registered != id);
        Some(removed)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.order.clone()
    }

    /// Summaries of all connections in registration order
    pub fn summaries(&self) -> Vec<ConnectionSummary> {
        self.order
            .iter()
            .filter_map(|id| self.connections.get(id))
            .map(Connection::summary)
            .collect()
    }

    /// Visit every registered connection once, in registration order.
    ///
    /// The pass runs over a copy of the id list taken on entry, so a visitor
    /// returning [`Visit::Remove`] for the current connection neither skips
    /// nor repeats any other entry. Returns the number of connections visited.
    pub fn for_each<F>(&mut self, mut visitor: F) -> usize
    where
        F: FnMut(&Connection) -> Visit,
    {
        let ids = self.order.clone();
        let mut visited = 0;
        for id in ids {
            let Some(connection) = self.connections.get(&id) else {
                continue;
            };
            visited += 1;
            if visitor(connection) == Visit::Remove {
                self.unregister(&id);
            }
        }
        visited
    }
}
