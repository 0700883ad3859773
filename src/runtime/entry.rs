use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::ApiClient;
use crate::app::Config;
use crate::constants::{
    ROUTE_ADMIN_DASHBOARD, ROUTE_HOME, ROUTE_LOGIN, ROUTE_SUPER_ADMIN_DASHBOARD,
};
use crate::session::{acknowledge_and_logout, Role, SessionStore, TomlSessionPersistence};

/// Everything a command handler needs: configuration, the session store and
/// the API client wired to it.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SessionStore>,
    pub client: ApiClient,
}

impl AppContext {
    pub async fn new(config: Config) -> Result<Self> {
        let session_path = match &config.session.file {
            Some(path) => path.clone(),
            None => TomlSessionPersistence::default_path()
                .context("Failed to resolve session file location")?,
        };
        let store = Arc::new(
            SessionStore::new(Box::new(TomlSessionPersistence::new(session_path)))
                .await
                .context("Failed to load persisted session")?,
        );
        let client = ApiClient::new(
            config.api.base_url.clone(),
            Arc::clone(&store),
            Duration::from_secs(config.api.timeout_secs),
        )
        .context("Failed to build API client")?;
        Ok(Self {
            config,
            store,
            client,
        })
    }
}

/// Initial navigation target for a persisted role, matching the backend's
/// role names
pub fn route_for_role(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::SuperAdmin) => ROUTE_SUPER_ADMIN_DASHBOARD,
        Some(Role::AdminKomunitas) => ROUTE_ADMIN_DASHBOARD,
        _ => ROUTE_HOME,
    }
}

/// If the session has been marked expired, run the forced-logout sequence:
/// a blocking acknowledgment, then clear + acknowledge, then back to the
/// unauthenticated entry point. Returns whether a logout happened.
pub async fn react_to_expiry(store: &SessionStore) -> Result<bool> {
    if !store.is_expired() {
        return Ok(false);
    }

    println!();
    println!(
        "{}",
        "Your session has expired. Press Enter to return to login."
            .red()
            .bold()
    );
    // Any dismissal gesture maps to the same acknowledgment
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);

    acknowledge_and_logout(store).await?;
    println!("You have been signed out. Run {} to sign in again.", "hobbyyk login".cyan());
    Ok(true)
}

/// Landing flow: decide where the user starts from the persisted session,
/// validating the stored token against the backend first.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let session = ctx.store.snapshot();

    if !session.is_authenticated() {
        println!("No session found.");
        println!("  route: {}", ROUTE_LOGIN.cyan());
        return Ok(());
    }

    match ctx.client.my_profile().await {
        Ok(profile) => {
            println!(
                "Signed in as {} <{}> ({})",
                profile.user.username.green().bold(),
                profile.user.email,
                profile.user.role
            );
            if let Some(community) = profile.managed_community {
                println!("  managing: {} (#{})", community.nama_komunitas, community.id);
            }
            println!("  route: {}", route_for_role(session.role).cyan());
            Ok(())
        }
        Err(err) => {
            if react_to_expiry(&ctx.store).await? {
                return Ok(());
            }
            Err(err).context("Failed to validate the stored session")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn routes_match_the_persisted_role() {
        assert_eq!(route_for_role(Some(Role::SuperAdmin)), "super_admin_dashboard");
        assert_eq!(route_for_role(Some(Role::AdminKomunitas)), "admin_dashboard");
        assert_eq!(route_for_role(Some(Role::User)), "home");
        assert_eq!(route_for_role(None), "home");
    }
}
