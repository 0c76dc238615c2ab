//! Check-in command implementation.

use anyhow::{Context, Result};
use clap::Args;

use evently_client::Client;
use evently_core::Role;

use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct CheckInArgs {
    /// Ticket id, as encoded in the QR code
    pub ticket: String,
}

pub async fn run(args: CheckInArgs, client: &Client) -> Result<()> {
    context::require_role(client, &[Role::Organizer, Role::Admin])?;

    let outcome = client
        .events()
        .check_in(&args.ticket)
        .await
        .context("Failed to check in ticket")?;

    // Any 2xx counts; older servers answer without a status flag.
    let fallback = if outcome.is_success() {
        "Ticket checked in successfully"
    } else {
        "Ticket processed"
    };
    output::success(outcome.message.as_deref().unwrap_or(fallback));
    if let Some(info) = &outcome.ticket_info {
        output::json_pretty(info)?;
    }
    Ok(())
}
