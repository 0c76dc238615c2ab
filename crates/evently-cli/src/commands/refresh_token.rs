//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use evently_client::Client;

use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, client: &Client) -> Result<()> {
    context::require_identity(client)?;

    output::note("Refreshing session...");

    if let Err(e) = client.session().refresh().await {
        if e.is_session_ended() {
            output::error("The session could not be renewed. Run 'evently login' to sign in again.");
        }
        return Err(e).context("Failed to refresh session");
    }

    let session = client
        .session()
        .current_session()
        .context("Session ended during refresh")?;

    output::success("Session refreshed successfully");
    output::field("User", &session.identity().id);
    output::field("Token expires", &session.expires_at().to_rfc3339());

    Ok(())
}
