//! WebSocket message types.
//!
//! Frames are JSON text, adjacently tagged as `{"event": ..., "data": ...}`.
//! Payload-less events omit `data`.

use serde::{Deserialize, Serialize};

use crate::room::{Scores, Team};

// ============================================================================
// Events (Server -> Client)
// ============================================================================

/// Events sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    // ========== Connection Events ==========
    /// Connection accepted; carries the id the server knows it by.
    Connected { id: String },

    /// Heartbeat/keepalive ping.
    Ping,

    // ========== Room Lifecycle Events ==========
    /// Room created for the sender.
    RoomCreated { code: String },

    /// Room creation failed.
    CreateError { error: String },

    /// Sender joined a room as guest.
    RoomJoined { team: Team, code: String },

    /// Join failed ("room not found" or "room full").
    JoinError { error: String },

    /// Sent to the host when a guest takes the second seat.
    OpponentJoined,

    /// Sent to the remaining member when the other one leaves.
    OpponentLeft,

    // ========== Game Events ==========
    GameStarted,

    ScoreUpdated {
        scores: Scores,
        #[serde(rename = "currentTeam")]
        current_team: Team,
    },

    GameOver { winner: Team },

    QuestionChanged { index: u32 },

    /// Per-answer feedback, relayed without touching room state.
    AnswerSelected {
        team: Team,
        correct: bool,
        points: i32,
    },

    // ========== Lobby Events ==========
    /// Chat line relayed to every connected client.
    NewMessage { message: String },
}

// ============================================================================
// Commands (Client -> Server)
// ============================================================================

/// Commands sent from clients to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Pong response to ping.
    Pong,

    CreateRoom,

    JoinRoom { code: String },

    StartGame { code: String },

    UpdateScore { code: String, team: Team, points: i32 },

    NextQuestion { code: String, index: u32 },

    AnswerSelected {
        code: String,
        team: Team,
        correct: bool,
        #[serde(default)]
        points: i32,
    },

    SendMessage { message: String },
}

impl ClientCommand {
    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pong => "pong",
            Self::CreateRoom => "create-room",
            Self::JoinRoom { .. } => "join-room",
            Self::StartGame { .. } => "start-game",
            Self::UpdateScore { .. } => "update-score",
            Self::NextQuestion { .. } => "next-question",
            Self::AnswerSelected { .. } => "answer-selected",
            Self::SendMessage { .. } => "send-message",
        }
    }
}
