use std::path::PathBuf;

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::SESSION_FILE_NAME;
use crate::session::store::{Session, SessionPersistence};
use crate::utils::HobbyError;

/// On-disk layout: three named fields, each optional independently so a
/// fresh install or a partially written file still loads.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    auth_token: Option<String>,
    user_role: Option<String>,
    user_id: Option<i64>,
}

/// Session persistence as a TOML file in the user's config directory
pub struct TomlSessionPersistence {
    path: PathBuf,
}

impl TomlSessionPersistence {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `<config dir>/hobbyyk/session.toml`
    pub fn default_path() -> Result<PathBuf, HobbyError> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "hobbyyk") {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            Ok(config_dir.join(SESSION_FILE_NAME))
        } else {
            // Fallback to home directory
            let home = std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .map_err(|_| {
                    HobbyError::Config("Could not determine home directory".to_string())
                })?;
            let config_dir = PathBuf::from(home).join(".config").join("hobbyyk");
            std::fs::create_dir_all(&config_dir)?;
            Ok(config_dir.join(SESSION_FILE_NAME))
        }
    }
}

#[async_trait]
impl SessionPersistence for TomlSessionPersistence {
    async fn load(&self) -> Result<Session, HobbyError> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let file: SessionFile =
            toml::from_str(&content).map_err(|e| HobbyError::Session(e.to_string()))?;
        Ok(Session {
            token: file.auth_token,
            // A role this client does not recognize loads as absent rather
            // than failing the whole session
            role: file.user_role.as_deref().and_then(|r| r.parse().ok()),
            user_id: file.user_id,
        })
    }

    async fn save(&self, session: &Session) -> Result<(), HobbyError> {
        let file = SessionFile {
            auth_token: session.token.clone(),
            user_role: session.role.map(|r| r.as_str().to_string()),
            user_id: session.user_id,
        };
        let content =
            toml::to_string_pretty(&file).map_err(|e| HobbyError::Session(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), HobbyError> {
        if self.path.exists() {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::Role;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn persistence_in(dir: &TempDir) -> TomlSessionPersistence {
        TomlSessionPersistence::new(dir.path().join("session.toml"))
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_session() {
        let dir = TempDir::new().unwrap();
        let persistence = persistence_in(&dir);
        assert_eq!(persistence.load().await.unwrap(), Session::default());
    }

    #[tokio::test]
    async fn session_round_trips_through_toml() {
        let dir = TempDir::new().unwrap();
        let persistence = persistence_in(&dir);

        let session = Session {
            token: Some("abc123".to_string()),
            role: Some(Role::AdminKomunitas),
            user_id: Some(9),
        };
        persistence.save(&session).await.unwrap();
        assert_eq!(persistence.load().await.unwrap(), session);
    }

    #[tokio::test]
    async fn partial_file_loads_without_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "auth_token = \"abc123\"\n").unwrap();

        let loaded = TomlSessionPersistence::new(path).load().await.unwrap();
        assert_eq!(loaded.token.as_deref(), Some("abc123"));
        assert_eq!(loaded.role, None);
        assert_eq!(loaded.user_id, None);
    }

    #[tokio::test]
    async fn unknown_role_loads_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(
            &path,
            "auth_token = \"abc123\"\nuser_role = \"moderator\"\nuser_id = 7\n",
        )
        .unwrap();

        let loaded = TomlSessionPersistence::new(path).load().await.unwrap();
        assert_eq!(loaded.token.as_deref(), Some("abc123"));
        assert_eq!(loaded.role, None);
        assert_eq!(loaded.user_id, Some(7));
    }

    #[tokio::test]
    async fn clear_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let persistence = persistence_in(&dir);

        persistence
            .save(&Session {
                token: Some("abc123".to_string()),
                role: Some(Role::User),
                user_id: Some(7),
            })
            .await
            .unwrap();
        persistence.clear().await.unwrap();

        assert_eq!(persistence.load().await.unwrap(), Session::default());
        // Clearing twice is fine
        persistence.clear().await.unwrap();
    }
}
