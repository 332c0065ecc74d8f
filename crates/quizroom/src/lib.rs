//! Quizroom Library
//!
//! Matchmaking and state relay for two-player quiz games: clients pair up in
//! short-code rooms over WebSocket and the server relays scores, turns and
//! question progression between them.

pub mod api;
pub mod room;
pub mod settings;
pub mod ws;
