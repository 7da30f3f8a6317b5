pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod exit;
pub mod render;
pub mod session;
pub mod shell;
pub mod store;
pub mod types;

pub use error::{FollowError, Result};
pub use session::UserSession;
pub use store::{LoadOptions, RelationshipStore};
