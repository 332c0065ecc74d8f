//! Room storage.
//!
//! The registry owns all policy; a store only keeps rooms keyed by code.

use std::collections::HashMap;

use super::models::Room;

/// Storage backend for live rooms.
pub trait RoomStore: Send {
    fn get(&self, code: &str) -> Option<&Room>;

    fn get_mut(&mut self, code: &str) -> Option<&mut Room>;

    /// Insert a room, replacing any room with the same code.
    fn insert(&mut self, room: Room);

    fn remove(&mut self, code: &str) -> Option<Room>;

    fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Codes of all live rooms.
    fn codes(&self) -> Vec<String>;
}

/// In-process `HashMap` store.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    rooms: HashMap<String, Room>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStore for MemoryRoomStore {
    fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    fn get_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    fn insert(&mut self, room: Room) {
        self.rooms.insert(room.code.clone(), room);
    }

    fn remove(&mut self, code: &str) -> Option<Room> {
        self.rooms.remove(code)
    }

    fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    fn len(&self) -> usize {
        self.rooms.len()
    }

    fn codes(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }
}
