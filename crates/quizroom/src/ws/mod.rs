//! Real-time session layer.
//!
//! ```text
//! ┌──────────────────────────┐
//! │  Clients (WebSocket)     │  ClientCommand in, ServerEvent out
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │  handler                 │  one task pair per socket
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐       ┌──────────────────────┐
//! │  SessionCoordinator      │──────►│  RoomRegistry        │
//! └────────────┬─────────────┘       └──────────────────────┘
//!              │ Transport
//! ┌────────────▼─────────────┐
//! │  WsHub                   │  connections + room broadcast groups
//! └──────────────────────────┘
//! ```

mod coordinator;
mod handler;
mod hub;
mod transport;
mod types;

pub use coordinator::SessionCoordinator;
pub use handler::ws_handler;
pub use hub::{WsHub, WsSender};
pub use transport::Transport;
pub use types::{ClientCommand, ServerEvent};
