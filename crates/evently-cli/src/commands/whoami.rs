//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use evently_client::Client;

use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Ask the server for the full profile instead of reading the token
    #[arg(long)]
    pub remote: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct WhoamiOutput<'a> {
    #[serde(flatten)]
    identity: &'a evently_core::Identity,
    expires_at: String,
}

pub async fn run(args: WhoamiArgs, client: &Client) -> Result<()> {
    context::require_identity(client)?;

    if args.remote {
        let profile = client
            .events()
            .current_user()
            .await
            .context("Failed to fetch profile")?;
        return output::json_pretty(&profile);
    }

    let session = client
        .session()
        .current_session()
        .context("No active session. Run 'evently login' first.")?;
    let expires_at = session.expires_at().to_rfc3339();

    if args.json {
        return output::json_pretty(&WhoamiOutput {
            identity: session.identity(),
            expires_at,
        });
    }

    let identity = session.identity();
    output::field("User", &identity.id);
    output::field("Name", &identity.name);
    output::field("Role", identity.role.as_str());
    output::field("Token expires", &expires_at);

    Ok(())
}
