//! WebSocket hub for managing client connections and room broadcast groups.

use dashmap::DashMap;
use log::{debug, info, warn};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use super::transport::Transport;
use super::types::ServerEvent;
use crate::room::ConnectionId;

/// Size of the per-connection send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// A sender for WebSocket messages to a specific client.
pub type WsSender = mpsc::Sender<ServerEvent>;

/// WebSocket hub tracking every live connection.
///
/// The hub is responsible for:
/// - Assigning each connection a stable id for its lifetime
/// - Tracking broadcast groups (one per room code)
/// - Delivering events without blocking the caller
pub struct WsHub {
    /// Connection ID -> outbound sender
    connections: DashMap<ConnectionId, WsSender>,

    /// Group name -> subscribed connection IDs
    groups: DashMap<String, HashSet<ConnectionId>>,
}

impl WsHub {
    /// Create a new WebSocket hub.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the assigned connection ID and a receiver for events targeted at it.
    pub fn register_connection(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER_SIZE);
        let conn_id = Uuid::new_v4().to_string();
        self.connections.insert(conn_id.clone(), tx);
        info!("Registered WebSocket connection {}", conn_id);
        (conn_id, rx)
    }

    /// Unregister a connection and drop all of its group subscriptions.
    pub fn unregister_connection(&self, conn_id: &str) {
        if self.connections.remove(conn_id).is_some() {
            info!("Unregistered WebSocket connection {}", conn_id);
        }

        for mut group in self.groups.iter_mut() {
            group.remove(conn_id);
        }

        // Clean up empty entries
        self.groups.retain(|_, members| !members.is_empty());
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_connected(&self, conn_id: &str) -> bool {
        self.connections.contains_key(conn_id)
    }

    /// Connection IDs subscribed to a group.
    pub fn group_members(&self, group: &str) -> Vec<ConnectionId> {
        self.groups
            .get(group)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn deliver(&self, conn_id: &str, event: ServerEvent) {
        let Some(tx) = self.connections.get(conn_id) else {
            debug!("Dropping event for unknown connection {}", conn_id);
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Send buffer full for connection {}, dropping event", conn_id);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Connection {} already closed", conn_id);
            }
        }
    }
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WsHub {
    fn send_to(&self, conn_id: &str, event: ServerEvent) {
        self.deliver(conn_id, event);
    }

    fn broadcast(&self, group: &str, event: ServerEvent) {
        for conn_id in self.group_members(group) {
            self.deliver(&conn_id, event.clone());
        }
    }

    fn broadcast_all(&self, event: ServerEvent) {
        let conn_ids: Vec<ConnectionId> = self
            .connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        for conn_id in conn_ids {
            self.deliver(&conn_id, event.clone());
        }
    }

    fn join_group(&self, conn_id: &str, group: &str) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(conn_id.to_string());
        debug!("Connection {} joined group {}", conn_id, group);
    }

    fn leave_group(&self, conn_id: &str, group: &str) {
        let now_empty = match self.groups.get_mut(group) {
            Some(mut members) => {
                members.remove(conn_id);
                members.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.groups.remove(group);
        }
        debug!("Connection {} left group {}", conn_id, group);
    }

    fn close_group(&self, group: &str) {
        if self.groups.remove(group).is_some() {
            debug!("Closed group {}", group);
        }
    }
}
