//! Application state shared across handlers.

use std::sync::Arc;

use crate::room::{MemoryRoomStore, RandomCodes, RoomRegistry};
use crate::settings::AppConfig;
use crate::ws::{SessionCoordinator, WsHub};

/// Shared state for the HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection and broadcast-group tracking.
    pub hub: Arc<WsHub>,
    /// Room lifecycle and relays.
    pub coordinator: Arc<SessionCoordinator>,
}

impl AppState {
    /// Wire a hub and coordinator around an existing registry.
    pub fn new(registry: RoomRegistry, winning_score: u32) -> Self {
        let hub = Arc::new(WsHub::new());
        let coordinator =
            SessionCoordinator::new(registry, hub.clone()).with_winning_score(winning_score);
        Self {
            hub,
            coordinator: Arc::new(coordinator),
        }
    }

    /// Build state from configuration with random room codes.
    pub fn from_config(config: &AppConfig) -> Self {
        let registry = RoomRegistry::with_parts(
            config.game.registry_config(),
            MemoryRoomStore::new(),
            RandomCodes::new(),
        );
        Self::new(registry, config.game.winning_score)
    }
}
