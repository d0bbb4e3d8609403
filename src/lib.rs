pub mod actions;
pub mod cli;
pub mod config;
pub mod events;
pub mod paths;
pub mod session;
pub mod subst;
pub mod watcher;
pub mod workspace;

pub use actions::*;
pub use config::*;
pub use events::*;
pub use session::*;
pub use subst::*;
pub use watcher::*;
pub use workspace::*;
