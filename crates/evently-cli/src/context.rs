//! Wiring the client to on-disk session storage.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;

use evently_client::{Client, ClientConfig};
use evently_core::traits::Navigator;
use evently_core::{Access, ApiUrl, Identity, Role};
use evently_file::FileStore;

use crate::output;

/// Overrides the platform data directory.
pub const DATA_DIR_ENV: &str = "EVENTLY_DATA_DIR";

/// Get the directory the session file lives in, creating it if needed.
fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => ProjectDirs::from("", "", "evently")
            .context("Could not determine data directory")?
            .data_dir()
            .to_path_buf(),
    };

    fs::create_dir_all(&dir).context("Failed to create data directory")?;
    Ok(dir)
}

/// Tells the user to log in again when the session ends mid-command.
struct LoginHint;

impl Navigator for LoginHint {
    fn redirect_to_login(&self) {
        output::error("Your session has expired. Run 'evently login' to sign in again.");
    }
}

/// Build a client whose session persists in the data directory.
pub fn connect(api_url: &str) -> Result<Client> {
    let api_url = ApiUrl::new(api_url).context("Invalid API URL")?;
    let storage = FileStore::in_dir(data_dir()?);
    tracing::debug!(path = %storage.path().display(), "Using session file");

    let mut config = ClientConfig::new(api_url);
    // Each invocation is short-lived; expired tokens are renewed on the first 401.
    config.session.proactive_refresh = false;

    Client::connect(config, Arc::new(storage), Arc::new(LoginHint)).context("Failed to create client")
}

/// The logged-in user, or an error telling them to log in.
pub fn require_identity(client: &Client) -> Result<Identity> {
    client
        .session()
        .current_identity()
        .context("No active session. Run 'evently login' first.")
}

/// Fail unless the logged-in user holds one of `allowed`.
pub fn require_role(client: &Client, allowed: &[Role]) -> Result<Identity> {
    let identity = client.session().current_identity();
    match Access::check(identity.as_ref(), allowed) {
        Access::Granted => identity.context("No active session. Run 'evently login' first."),
        Access::Unauthenticated => bail!("No active session. Run 'evently login' first."),
        Access::Forbidden => {
            let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            let role = identity.map(|i| i.role).unwrap_or_default();
            bail!(
                "This command needs the {} role; you are logged in as {}.",
                names.join(" or "),
                role
            )
        }
    }
}
