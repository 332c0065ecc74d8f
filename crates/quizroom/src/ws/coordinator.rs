//! Session coordinator.
//!
//! Binds inbound connection events to registry operations and relays the
//! outcome to the right peers. The registry sits behind a single lock that is
//! held for the whole of one event, so each event is one atomic room mutation
//! and its relays leave in order.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use super::transport::Transport;
use super::types::{ClientCommand, ServerEvent};
use crate::room::{
    DEFAULT_WINNING_SCORE, Removal, RoomError, RoomRegistry, RoomSnapshot, Team, check_winner,
};

pub struct SessionCoordinator {
    registry: Mutex<RoomRegistry>,
    transport: Arc<dyn Transport>,
    winning_score: u32,
}

impl SessionCoordinator {
    pub fn new(registry: RoomRegistry, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry: Mutex::new(registry),
            transport,
            winning_score: DEFAULT_WINNING_SCORE,
        }
    }

    /// Override the score that ends a game.
    pub fn with_winning_score(mut self, winning_score: u32) -> Self {
        self.winning_score = winning_score;
        self
    }

    /// Handle one command from a connection.
    pub async fn handle(&self, conn_id: &str, cmd: ClientCommand) {
        debug!("{} from {}", cmd.name(), conn_id);
        let mut registry = self.registry.lock().await;

        match cmd {
            ClientCommand::Pong => {}

            ClientCommand::CreateRoom => match registry.create_room(conn_id) {
                Ok(created) => {
                    if let Some(left) = created.left {
                        self.relay_removal(conn_id, &left);
                    }
                    self.transport.join_group(conn_id, &created.code);
                    self.transport
                        .send_to(conn_id, ServerEvent::RoomCreated { code: created.code });
                }
                Err(e) => {
                    info!("Room creation failed for {}: {}", conn_id, e);
                    self.transport.send_to(
                        conn_id,
                        ServerEvent::CreateError {
                            error: e.to_string(),
                        },
                    );
                }
            },

            ClientCommand::JoinRoom { code } => match registry.join_room(&code, conn_id) {
                Ok(outcome) => {
                    if let Some(left) = &outcome.left {
                        self.relay_removal(conn_id, left);
                    }
                    self.transport.join_group(conn_id, &outcome.code);
                    self.transport.send_to(
                        conn_id,
                        ServerEvent::RoomJoined {
                            team: outcome.team,
                            code: outcome.code,
                        },
                    );
                    self.transport
                        .send_to(&outcome.host, ServerEvent::OpponentJoined);
                }
                Err(e) => {
                    debug!("{} could not join room {}: {}", conn_id, code, e);
                    self.transport.send_to(
                        conn_id,
                        ServerEvent::JoinError {
                            error: e.to_string(),
                        },
                    );
                }
            },

            ClientCommand::StartGame { code } => match registry.start_game(&code, conn_id) {
                Ok(()) => self.transport.broadcast(&code, ServerEvent::GameStarted),
                Err(RoomError::NotAuthorized) => {
                    debug!("Ignoring start-game from non-host {} in {}", conn_id, code);
                }
                Err(e) => debug!("Ignoring start-game for {}: {}", code, e),
            },

            ClientCommand::UpdateScore { code, team, points } => {
                if !is_seated(&registry, conn_id, &code) {
                    return;
                }
                let Some(snapshot) = registry.update_score(&code, team, points) else {
                    debug!("Ignoring update-score for unknown room {}", code);
                    return;
                };
                self.transport.broadcast(
                    &code,
                    ServerEvent::ScoreUpdated {
                        scores: snapshot.scores,
                        current_team: snapshot.current_team,
                    },
                );

                if let Some(winner) = check_winner(&snapshot, self.winning_score) {
                    self.finish_game(&mut registry, &code, winner);
                }
            }

            ClientCommand::NextQuestion { code, index } => {
                if !is_seated(&registry, conn_id, &code) {
                    return;
                }
                if registry.advance_question(&code, index) {
                    self.transport
                        .broadcast(&code, ServerEvent::QuestionChanged { index });
                } else {
                    debug!("Ignoring next-question for unknown room {}", code);
                }
            }

            ClientCommand::AnswerSelected {
                code,
                team,
                correct,
                points,
            } => {
                if !is_seated(&registry, conn_id, &code) {
                    return;
                }
                self.transport.broadcast(
                    &code,
                    ServerEvent::AnswerSelected {
                        team,
                        correct,
                        points,
                    },
                );
            }

            ClientCommand::SendMessage { message } => {
                self.transport
                    .broadcast_all(ServerEvent::NewMessage { message });
            }
        }
    }

    /// Handle a connection going away.
    pub async fn disconnect(&self, conn_id: &str) {
        let mut registry = self.registry.lock().await;
        if let Some(removal) = registry.remove_member(conn_id) {
            self.relay_removal(conn_id, &removal);
        }
    }

    /// Announce the winner and tear the room down.
    fn finish_game(&self, registry: &mut RoomRegistry, code: &str, winner: Team) {
        info!("Room {} won by {}", code, winner);
        self.transport
            .broadcast(code, ServerEvent::GameOver { winner });
        registry.delete_room(code);
        self.transport.close_group(code);
    }

    fn relay_removal(&self, conn_id: &str, removal: &Removal) {
        self.transport.leave_group(conn_id, removal.code());
        match removal {
            Removal::MemberRemoved { remaining, .. } => {
                self.transport.send_to(remaining, ServerEvent::OpponentLeft);
            }
            Removal::RoomDeleted { code } => self.transport.close_group(code),
        }
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.room_count()
    }

    pub async fn snapshot(&self, code: &str) -> Option<RoomSnapshot> {
        self.registry.lock().await.snapshot(code)
    }
}

/// Whether `conn_id` occupies room `code`. Unknown rooms and outsiders are
/// both ignored silently.
fn is_seated(registry: &RoomRegistry, conn_id: &str, code: &str) -> bool {
    if registry.room_of(conn_id) == Some(code) {
        return true;
    }
    debug!("Ignoring command for room {} from non-member {}", code, conn_id);
    false
}
