//! Room lifecycle and membership.
//!
//! A room pairs a host and at most one guest under a short numeric code and
//! holds their client-reported score and turn state until the game ends or
//! both players leave.

mod code;
mod error;
mod models;
mod registry;
mod store;

pub use code::{CodeGenerator, FixedCodes, RandomCodes};
pub use error::{RoomError, RoomResult};
pub use models::{
    ConnectionId, JoinOutcome, ROOM_CAPACITY, Removal, Room, RoomSnapshot, Scores, Team,
};
pub use registry::{
    Created, DEFAULT_MAX_CODE_ATTEMPTS, DEFAULT_WINNING_SCORE, RegistryConfig, RoomRegistry,
    check_winner,
};
pub use store::{MemoryRoomStore, RoomStore};
