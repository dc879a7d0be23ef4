pub mod config;
pub mod error;
pub mod relay;
pub mod session;
pub mod signaling;

pub use config::ServerConfig;
pub use error::SignalingError;
pub use relay::{LinkSnapshot, RelayEngine};
pub use session::{Roster, SessionCommand, SessionManager, SessionSnapshot};
pub use signaling::{AppState, SignalingOutput, SignalingService, ws_handler};
