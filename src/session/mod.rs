/// Session lifecycle module - Gateway

mod file;
mod store;
mod watcher;

pub use file::TomlSessionPersistence;
pub use store::{Role, Session, SessionPersistence, SessionStore};
pub use watcher::{acknowledge_and_logout, watch_forced_logout};
