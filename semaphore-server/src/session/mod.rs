mod command;
mod roster;
mod session;
mod session_manager;

pub use command::*;
pub use roster::*;
pub use session::*;
pub use session_manager::*;
