//! Transport boundary used by the session coordinator.

use super::types::ServerEvent;

/// Real-time transport the coordinator relays through.
///
/// Every method is fire-and-forget: delivery problems are the transport's to
/// log, never the caller's to handle, and no call waits on a peer.
pub trait Transport: Send + Sync {
    /// Unicast to one connection.
    fn send_to(&self, conn_id: &str, event: ServerEvent);

    /// Send to every connection subscribed to `group`.
    fn broadcast(&self, group: &str, event: ServerEvent);

    /// Send to every connected client.
    fn broadcast_all(&self, event: ServerEvent);

    /// Subscribe a connection to a broadcast group.
    fn join_group(&self, conn_id: &str, group: &str);

    /// Unsubscribe a connection from a broadcast group.
    fn leave_group(&self, conn_id: &str, group: &str);

    /// Drop a group and all of its subscriptions.
    fn close_group(&self, group: &str);
}
