pub mod api;
pub mod app;
pub mod cli;
pub mod constants;
pub mod http;
pub mod runtime;
pub mod session;
pub mod utils;

pub use api::ApiClient;
pub use app::{load_config, Config};
pub use http::AuthPipeline;
pub use session::{Role, Session, SessionStore, TomlSessionPersistence};
pub use utils::HobbyError;
