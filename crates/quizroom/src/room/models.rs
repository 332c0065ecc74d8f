//! Room data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a client connection, assigned by the transport.
pub type ConnectionId = String;

/// Maximum number of members a room can hold.
pub const ROOM_CAPACITY: usize = 2;

/// One of the two competing teams.
///
/// Serialized as the bare integer `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Team {
    One,
    Two,
}

impl Team {
    /// The opposing team.
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl TryFrom<u8> for Team {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid team {other}, expected 1 or 2")),
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> Self {
        team.number()
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "team {}", self.number())
    }
}

/// Per-team score counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub team1: u32,
    pub team2: u32,
}

impl Scores {
    /// Add `delta` to a team's counter, never dropping below zero.
    pub fn apply(&mut self, team: Team, delta: i32) {
        let counter = match team {
            Team::One => &mut self.team1,
            Team::Two => &mut self.team2,
        };
        *counter = counter.saturating_add_signed(delta);
    }

    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }
}

/// A live two-player room.
#[derive(Debug, Clone)]
pub struct Room {
    /// 4-digit numeric code
    pub code: String,
    /// Index 0 is the host, index 1 the guest
    pub members: Vec<ConnectionId>,
    pub scores: Scores,
    /// Team whose turn is active
    pub current_team: Team,
    pub current_question_index: u32,
    pub started: bool,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Create a room owned by `host`.
    pub fn new(code: impl Into<String>, host: impl Into<ConnectionId>) -> Self {
        Self {
            code: code.into(),
            members: vec![host.into()],
            scores: Scores::default(),
            current_team: Team::One,
            current_question_index: 0,
            started: false,
            created_at: Utc::now(),
        }
    }

    pub fn host(&self) -> Option<&ConnectionId> {
        self.members.first()
    }

    pub fn is_host(&self, member: &str) -> bool {
        self.host().is_some_and(|host| host == member)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m == member)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot::from(self)
    }
}

/// Serializable view of a room's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: String,
    pub members: Vec<ConnectionId>,
    pub scores: Scores,
    pub current_team: Team,
    pub current_question_index: u32,
    pub started: bool,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            code: room.code.clone(),
            members: room.members.clone(),
            scores: room.scores,
            current_team: room.current_team,
            current_question_index: room.current_question_index,
            started: room.started,
        }
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub code: String,
    /// Team assigned to the joiner
    pub team: Team,
    /// Host to notify about the new opponent
    pub host: ConnectionId,
    /// Previous room the joiner was removed from, if any
    pub left: Option<Removal>,
}

/// Result of removing a member from its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The member was the last occupant; the room is gone.
    RoomDeleted { code: String },
    /// The room survives with `remaining` as its only member.
    MemberRemoved { code: String, remaining: ConnectionId },
}

impl Removal {
    pub fn code(&self) -> &str {
        match self {
            Self::RoomDeleted { code } | Self::MemberRemoved { code, .. } => code,
        }
    }
}
