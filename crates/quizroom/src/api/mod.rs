//! HTTP API module.
//!
//! A thin layer around the WebSocket endpoint: health check, debug counters
//! and an optional static landing page.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
