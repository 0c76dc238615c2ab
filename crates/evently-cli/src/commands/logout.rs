//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use evently_client::Client;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, client: &Client) -> Result<()> {
    let was_logged_in = client.session().current_identity().is_some();
    client.session().logout();

    if was_logged_in {
        output::success("Logged out");
    } else {
        output::note("No active session.");
    }
    Ok(())
}
