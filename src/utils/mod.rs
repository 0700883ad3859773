// Gateway module for utils - all external access goes through this gateway

mod errors;
mod logger;

pub use errors::HobbyError;
pub use logger::init_logger;
