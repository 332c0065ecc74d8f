//! Room registry.
//!
//! Owns every live room keyed by its code, hands out collision-free codes,
//! and enforces the membership rules: at most two members per room, one room
//! per connection, and no empty rooms left behind.

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::code::{CODE_SPACE, CodeGenerator, RandomCodes, is_valid_code};
use super::error::{RoomError, RoomResult};
use super::models::{ConnectionId, JoinOutcome, Removal, Room, RoomSnapshot, Team};
use super::store::{MemoryRoomStore, RoomStore};

/// Score at which a team wins.
pub const DEFAULT_WINNING_SCORE: u32 = 100;

/// Default number of code draws before giving up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: usize = 100;

/// Registry tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Code draws attempted per room creation before `CapacityExhausted`.
    pub max_code_attempts: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

/// A freshly created room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub code: String,
    /// Previous room the creator was removed from, if any.
    pub left: Option<Removal>,
}

/// Registry of live rooms.
pub struct RoomRegistry {
    store: Box<dyn RoomStore>,
    codes: Box<dyn CodeGenerator>,
    /// Connection -> code of the room it occupies
    membership: HashMap<ConnectionId, String>,
    config: RegistryConfig,
}

impl RoomRegistry {
    /// In-memory registry with OS-seeded random codes.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_parts(config, MemoryRoomStore::new(), RandomCodes::new())
    }

    /// Registry with an injected store and code source.
    pub fn with_parts(
        config: RegistryConfig,
        store: impl RoomStore + 'static,
        codes: impl CodeGenerator + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            codes: Box::new(codes),
            membership: HashMap::new(),
            config,
        }
    }

    /// Create a room hosted by `creator` and return its code.
    ///
    /// A creator already seated elsewhere is removed from that room once a
    /// code is secured. A failed creation leaves the registry untouched.
    pub fn create_room(&mut self, creator: &str) -> RoomResult<Created> {
        if self.store.len() >= CODE_SPACE {
            return Err(RoomError::CapacityExhausted);
        }

        // Leaving the old room only frees codes, so the drawn one stays unused.
        let code = self.unused_code()?;
        let left = self.remove_member(creator);
        self.store.insert(Room::new(code.clone(), creator));
        self.membership.insert(creator.to_string(), code.clone());

        info!("Created room {} for {}", code, creator);
        Ok(Created { code, left })
    }

    fn unused_code(&mut self) -> RoomResult<String> {
        for attempt in 1..=self.config.max_code_attempts {
            let code = self.codes.next_code();
            if !self.store.contains(&code) {
                return Ok(code);
            }
            debug!("Room code {} in use (attempt {})", code, attempt);
        }
        Err(RoomError::CapacityExhausted)
    }

    /// Seat `joiner` as the guest of room `code`.
    ///
    /// Validation happens before anything changes, so a failed join leaves
    /// the registry untouched.
    pub fn join_room(&mut self, code: &str, joiner: &str) -> RoomResult<JoinOutcome> {
        if !is_valid_code(code) {
            debug!("Rejecting malformed room code {:?} from {}", code, joiner);
            return Err(RoomError::RoomNotFound);
        }
        let room = self.store.get(code).ok_or(RoomError::RoomNotFound)?;
        if room.is_full() || room.contains(joiner) {
            return Err(RoomError::RoomFull);
        }

        let left = self.remove_member(joiner);

        // Leaving the previous room cannot touch this one: the joiner was not in it.
        let room = self.store.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        room.members.push(joiner.to_string());
        let host = room.host().cloned().unwrap_or_default();
        self.membership.insert(joiner.to_string(), code.to_string());

        info!("{} joined room {} hosted by {}", joiner, code, host);
        Ok(JoinOutcome {
            code: code.to_string(),
            team: Team::Two,
            host,
            left,
        })
    }

    /// Mark the game as started. Only the host may do this.
    pub fn start_game(&mut self, code: &str, requester: &str) -> RoomResult<()> {
        let room = self.store.get_mut(code).ok_or(RoomError::RoomNotFound)?;
        if !room.is_host(requester) {
            return Err(RoomError::NotAuthorized);
        }
        room.started = true;
        info!("Game started in room {}", code);
        Ok(())
    }

    /// Add `delta` to `team` and hand the turn to the other team.
    ///
    /// Returns `None` for unknown rooms; late updates after teardown are inert.
    pub fn update_score(&mut self, code: &str, team: Team, delta: i32) -> Option<RoomSnapshot> {
        let room = self.store.get_mut(code)?;
        room.scores.apply(team, delta);
        room.current_team = team.other();
        debug!(
            "Room {} scores {}-{}, turn {}",
            code, room.scores.team1, room.scores.team2, room.current_team
        );
        Some(room.snapshot())
    }

    /// Point the room at question `index`. Last write wins; rewinding is allowed.
    ///
    /// Returns false for unknown rooms.
    pub fn advance_question(&mut self, code: &str, index: u32) -> bool {
        match self.store.get_mut(code) {
            Some(room) => {
                room.current_question_index = index;
                true
            }
            None => false,
        }
    }

    /// Remove `member` from whichever room it occupies.
    ///
    /// Deletes the room when it becomes empty. Returns `None` when the member
    /// is not seated anywhere.
    pub fn remove_member(&mut self, member: &str) -> Option<Removal> {
        let code = self.membership.remove(member)?;
        let room = self.store.get_mut(&code)?;
        room.members.retain(|m| m != member);

        match room.members.first().cloned() {
            Some(remaining) => {
                info!("{} left room {}, {} remains", member, code, remaining);
                Some(Removal::MemberRemoved { code, remaining })
            }
            None => {
                self.delete_room(&code);
                Some(Removal::RoomDeleted { code })
            }
        }
    }

    /// Unconditionally delete a room and forget its members.
    pub fn delete_room(&mut self, code: &str) -> Option<Room> {
        let room = self.store.remove(code)?;
        for member in &room.members {
            self.membership.remove(member);
        }
        let age = chrono::Utc::now() - room.created_at;
        info!("Deleted room {} after {}s", code, age.num_seconds());
        Some(room)
    }

    pub fn snapshot(&self, code: &str) -> Option<RoomSnapshot> {
        self.store.get(code).map(Room::snapshot)
    }

    /// Code of the room `member` occupies.
    pub fn room_of(&self, member: &str) -> Option<&str> {
        self.membership.get(member).map(String::as_str)
    }

    pub fn room_count(&self) -> usize {
        self.store.len()
    }

    pub fn codes(&self) -> Vec<String> {
        self.store.codes()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

/// The winning team, if either score has reached `threshold`.
///
/// Higher score wins; a tie at or above the threshold goes to team 1.
pub fn check_winner(snapshot: &RoomSnapshot, threshold: u32) -> Option<Team> {
    let scores = snapshot.scores;
    if scores.team1 < threshold && scores.team2 < threshold {
        return None;
    }
    if scores.team2 > scores.team1 {
        Some(Team::Two)
    } else {
        Some(Team::One)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::code::{FixedCodes, MAX_CODE, MIN_CODE};
    use std::collections::HashSet;

    fn registry_with_codes(codes: &[&str]) -> RoomRegistry {
        RoomRegistry::with_parts(
            RegistryConfig::default(),
            MemoryRoomStore::new(),
            FixedCodes::new(codes.iter().copied()),
        )
    }

    #[test]
    fn test_create_room_seats_host() {
        let mut registry = registry_with_codes(&["4821"]);
        let created = registry.create_room("A").unwrap();

        assert_eq!(created.code, "4821");
        assert!(created.left.is_none());
        let snapshot = registry.snapshot("4821").unwrap();
        assert_eq!(snapshot.members, vec!["A".to_string()]);
        assert_eq!(registry.room_of("A"), Some("4821"));
    }

    #[test]
    fn test_create_room_retries_on_collision() {
        let mut registry = registry_with_codes(&["1111", "1111", "2222"]);
        assert_eq!(registry.create_room("A").unwrap().code, "1111");
        assert_eq!(registry.create_room("B").unwrap().code, "2222");
    }

    #[test]
    fn test_create_room_gives_up_after_max_attempts() {
        let mut registry = RoomRegistry::with_parts(
            RegistryConfig {
                max_code_attempts: 5,
            },
            MemoryRoomStore::new(),
            FixedCodes::new(["1111"]),
        );
        registry.create_room("A").unwrap();
        assert_eq!(
            registry.create_room("B").unwrap_err(),
            RoomError::CapacityExhausted
        );
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn test_failed_create_keeps_creator_seated() {
        let mut registry = RoomRegistry::with_parts(
            RegistryConfig {
                max_code_attempts: 3,
            },
            MemoryRoomStore::new(),
            FixedCodes::new(["1111"]),
        );
        registry.create_room("A").unwrap();
        registry.join_room("1111", "B").unwrap();

        assert_eq!(
            registry.create_room("B").unwrap_err(),
            RoomError::CapacityExhausted
        );
        assert_eq!(registry.room_of("B"), Some("1111"));
        assert_eq!(
            registry.snapshot("1111").unwrap().members,
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn test_create_room_fails_when_code_space_is_full() {
        let all_codes = (MIN_CODE..=MAX_CODE).map(|c| c.to_string());
        let mut registry = RoomRegistry::with_parts(
            RegistryConfig::default(),
            MemoryRoomStore::new(),
            FixedCodes::new(all_codes),
        );
        for n in 0..CODE_SPACE {
            registry.create_room(&format!("conn-{n}")).unwrap();
        }
        assert_eq!(registry.room_count(), CODE_SPACE);

        assert_eq!(
            registry.create_room("late").unwrap_err(),
            RoomError::CapacityExhausted
        );
        assert_eq!(registry.room_of("late"), None);
        assert_eq!(registry.room_count(), CODE_SPACE);

        // a seated creator is not moved either
        assert_eq!(
            registry.create_room("conn-0").unwrap_err(),
            RoomError::CapacityExhausted
        );
        assert_eq!(registry.room_of("conn-0"), Some("1000"));
    }

    #[test]
    fn test_random_codes_unique_among_live_rooms() {
        let mut registry = RoomRegistry::with_parts(
            RegistryConfig::default(),
            MemoryRoomStore::new(),
            RandomCodes::seeded(1),
        );
        let mut seen = HashSet::new();
        for i in 0..500 {
            let code = registry.create_room(&format!("conn-{i}")).unwrap().code;
            assert!(seen.insert(code), "duplicate live code");
        }
        assert_eq!(registry.room_count(), 500);
    }

    #[test]
    fn test_code_reused_after_deletion() {
        let mut registry = registry_with_codes(&["1111"]);
        registry.create_room("A").unwrap();
        registry.delete_room("1111");
        assert_eq!(registry.create_room("B").unwrap().code, "1111");
    }

    #[test]
    fn test_join_unknown_room_does_not_mutate() {
        let mut registry = registry_with_codes(&["1111"]);
        registry.create_room("A").unwrap();

        assert_eq!(
            registry.join_room("9999", "B").unwrap_err(),
            RoomError::RoomNotFound
        );
        assert_eq!(registry.room_count(), 1);
        assert_eq!(registry.room_of("B"), None);
        assert_eq!(registry.snapshot("1111").unwrap().members.len(), 1);
    }

    #[test]
    fn test_join_assigns_team_two() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();

        let outcome = registry.join_room("4821", "B").unwrap();
        assert_eq!(outcome.team, Team::Two);
        assert_eq!(outcome.host, "A");
        assert!(outcome.left.is_none());
        assert_eq!(
            registry.snapshot("4821").unwrap().members,
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn test_join_full_room() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        registry.join_room("4821", "B").unwrap();

        assert_eq!(
            registry.join_room("4821", "C").unwrap_err(),
            RoomError::RoomFull
        );
        assert_eq!(registry.snapshot("4821").unwrap().members.len(), 2);
        assert_eq!(registry.room_of("C"), None);
    }

    #[test]
    fn test_host_cannot_join_own_room() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        assert_eq!(
            registry.join_room("4821", "A").unwrap_err(),
            RoomError::RoomFull
        );
        assert_eq!(registry.snapshot("4821").unwrap().members.len(), 1);
    }

    #[test]
    fn test_join_after_start_is_allowed() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        registry.start_game("4821", "A").unwrap();
        assert!(registry.join_room("4821", "B").is_ok());
    }

    #[test]
    fn test_joining_elsewhere_leaves_previous_room() {
        let mut registry = registry_with_codes(&["1111", "2222"]);
        registry.create_room("A").unwrap();
        registry.create_room("B").unwrap();
        registry.join_room("1111", "C").unwrap();

        let outcome = registry.join_room("2222", "C").unwrap();
        assert_eq!(
            outcome.left,
            Some(Removal::MemberRemoved {
                code: "1111".to_string(),
                remaining: "A".to_string(),
            })
        );
        assert_eq!(registry.room_of("C"), Some("2222"));
        assert_eq!(registry.snapshot("1111").unwrap().members.len(), 1);
    }

    #[test]
    fn test_creating_again_deletes_previous_solo_room() {
        let mut registry = registry_with_codes(&["1111", "2222"]);
        registry.create_room("A").unwrap();
        let created = registry.create_room("A").unwrap();

        assert_eq!(created.code, "2222");
        assert_eq!(
            created.left,
            Some(Removal::RoomDeleted {
                code: "1111".to_string()
            })
        );
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn test_start_game_host_only() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        registry.join_room("4821", "B").unwrap();

        assert_eq!(
            registry.start_game("4821", "B").unwrap_err(),
            RoomError::NotAuthorized
        );
        assert!(!registry.snapshot("4821").unwrap().started);

        registry.start_game("4821", "A").unwrap();
        assert!(registry.snapshot("4821").unwrap().started);
    }

    #[test]
    fn test_start_game_unknown_room() {
        let mut registry = RoomRegistry::default();
        assert_eq!(
            registry.start_game("1234", "A").unwrap_err(),
            RoomError::RoomNotFound
        );
    }

    #[test]
    fn test_update_score_flips_turn() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();

        let snapshot = registry.update_score("4821", Team::One, 10).unwrap();
        assert_eq!(snapshot.scores.team1, 10);
        assert_eq!(snapshot.current_team, Team::Two);

        let snapshot = registry.update_score("4821", Team::Two, 5).unwrap();
        assert_eq!(snapshot.scores.team2, 5);
        assert_eq!(snapshot.current_team, Team::One);
    }

    #[test]
    fn test_update_score_unknown_room_is_noop() {
        let mut registry = RoomRegistry::default();
        assert!(registry.update_score("1234", Team::One, 10).is_none());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_update_score_rooms_are_independent() {
        let mut registry = registry_with_codes(&["1111", "2222"]);
        registry.create_room("A").unwrap();
        registry.create_room("B").unwrap();

        registry.update_score("1111", Team::One, 40);
        registry.update_score("2222", Team::Two, 7);

        let first = registry.snapshot("1111").unwrap();
        let second = registry.snapshot("2222").unwrap();
        assert_eq!((first.scores.team1, first.scores.team2), (40, 0));
        assert_eq!((second.scores.team1, second.scores.team2), (0, 7));
    }

    #[test]
    fn test_advance_question_last_write_wins() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();

        assert!(registry.advance_question("4821", 5));
        assert!(registry.advance_question("4821", 2));
        assert_eq!(registry.snapshot("4821").unwrap().current_question_index, 2);
        assert!(!registry.advance_question("9999", 1));
    }

    #[test]
    fn test_remove_one_of_two_members() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        registry.join_room("4821", "B").unwrap();

        let removal = registry.remove_member("B").unwrap();
        assert_eq!(
            removal,
            Removal::MemberRemoved {
                code: "4821".to_string(),
                remaining: "A".to_string(),
            }
        );
        assert_eq!(
            registry.snapshot("4821").unwrap().members,
            vec!["A".to_string()]
        );
    }

    #[test]
    fn test_remove_host_promotes_guest() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        registry.join_room("4821", "B").unwrap();

        registry.remove_member("A").unwrap();
        assert!(registry.start_game("4821", "B").is_ok());
    }

    #[test]
    fn test_remove_last_member_deletes_room() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();

        assert_eq!(
            registry.remove_member("A"),
            Some(Removal::RoomDeleted {
                code: "4821".to_string()
            })
        );
        assert_eq!(registry.room_count(), 0);
        assert_eq!(registry.room_of("A"), None);
    }

    #[test]
    fn test_remove_unknown_member_is_noop() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        assert!(registry.remove_member("Z").is_none());
        assert_eq!(registry.room_count(), 1);
    }

    #[test]
    fn test_delete_room_forgets_members() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();
        registry.join_room("4821", "B").unwrap();

        assert!(registry.delete_room("4821").is_some());
        assert!(registry.delete_room("4821").is_none());
        assert_eq!(registry.room_of("A"), None);
        assert!(registry.remove_member("B").is_none());
    }

    #[test]
    fn test_check_winner() {
        let mut registry = registry_with_codes(&["4821"]);
        registry.create_room("A").unwrap();

        let snapshot = registry.update_score("4821", Team::Two, 99).unwrap();
        assert_eq!(check_winner(&snapshot, DEFAULT_WINNING_SCORE), None);

        let snapshot = registry.update_score("4821", Team::Two, 1).unwrap();
        assert_eq!(check_winner(&snapshot, DEFAULT_WINNING_SCORE), Some(Team::Two));
    }

    #[test]
    fn test_check_winner_tie_goes_to_team_one() {
        let mut room = Room::new("4821", "A");
        room.scores.team1 = 120;
        room.scores.team2 = 120;
        assert_eq!(check_winner(&room.snapshot(), 100), Some(Team::One));
    }
}
