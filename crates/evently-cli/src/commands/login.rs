//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use evently_client::Client;
use evently_core::Credentials;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "EVENTLY_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, client: &Client) -> Result<()> {
    let credentials = Credentials::new(args.username, args.password);

    output::note("Logging in...");

    let identity = client
        .session()
        .login(credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &identity.id);
    output::field("Name", &identity.name);
    output::field("Role", identity.role.as_str());

    Ok(())
}
