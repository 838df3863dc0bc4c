//! Connection management for WebSocket clients.
//!
//! Tracks connected clients and the rooms they joined, and fans domain events
//! out to every connection in the event's room.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use skirmish_domain::{DomainEvent, EventTopic, UserId};
use skirmish_shared::ServerMessage;

use crate::infrastructure::ports::EventPublisher;

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    /// Caller identity, if the client supplied one
    pub user_id: Option<UserId>,
    /// Rooms this connection receives broadcasts for
    pub rooms: HashSet<EventTopic>,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: DashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>,
}

pub type SharedConnectionManager = Arc<ConnectionManager>;

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection.
    pub fn register(
        &self,
        connection_id: Uuid,
        user_id: Option<UserId>,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            user_id,
            rooms: HashSet::new(),
        };
        self.connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub fn unregister(&self, connection_id: Uuid) {
        if self.connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Get connection info by ID.
    pub fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        self.connections
            .get(&connection_id)
            .map(|entry| entry.value().0.clone())
    }

    /// Join a room.
    pub fn join(&self, connection_id: Uuid, topic: EventTopic) -> Result<(), ConnectionError> {
        let mut entry = self
            .connections
            .get_mut(&connection_id)
            .ok_or(ConnectionError::NotFound)?;
        entry.value_mut().0.rooms.insert(topic);
        tracing::info!(connection_id = %connection_id, room = %topic, "Connection joined room");
        Ok(())
    }

    /// Leave a room. Returns whether the connection was in it.
    pub fn leave(&self, connection_id: Uuid, topic: EventTopic) -> bool {
        let left = self
            .connections
            .get_mut(&connection_id)
            .is_some_and(|mut entry| entry.value_mut().0.rooms.remove(&topic));
        if left {
            tracing::info!(connection_id = %connection_id, room = %topic, "Connection left room");
        }
        left
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of connections in a room.
    pub fn subscriber_count(&self, topic: EventTopic) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().0.rooms.contains(&topic))
            .count()
    }

    /// Broadcast a message to every connection in a room.
    ///
    /// Never waits: a connection whose buffer is full or closed misses the
    /// message. Returns how many connections accepted it.
    pub fn broadcast(&self, topic: EventTopic, message: &ServerMessage) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            let (info, sender) = entry.value();
            if !info.rooms.contains(&topic) {
                continue;
            }
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %info.connection_id,
                        room = %topic,
                        error = %e,
                        "Failed to broadcast message"
                    );
                }
            }
        }
        delivered
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for ConnectionManager {
    fn publish(&self, event: DomainEvent) {
        let topic = event.topic();
        let message = ServerMessage::from(&event);
        let delivered = self.broadcast(topic, &message);
        tracing::debug!(
            room = %topic,
            event = event.event_type(),
            delivered,
            "Event published"
        );
    }
}

/// Errors that can occur during connection operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
}
