use thiserror::Error;

/// Main error type for the HobbyYK client
#[derive(Error, Debug)]
pub enum HobbyError {
    /// Network never produced a response (timeout, DNS, connection refused).
    /// These never touch session state.
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status. A 401/403 has already
    /// been reported to the session store by the time this surfaces.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HobbyError {
    /// Map a reqwest failure that occurred before a response was received.
    pub fn transport(err: reqwest::Error) -> Self {
        HobbyError::Transport(err.to_string())
    }
}
