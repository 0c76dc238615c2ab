//! My registrations command implementation.

use anyhow::{Context, Result};
use clap::Args;

use evently_client::Client;

use crate::commands::events::print_ticket;
use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct MyRegistrationsArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: MyRegistrationsArgs, client: &Client) -> Result<()> {
    context::require_identity(client)?;

    let registrations = client
        .events()
        .my_registrations()
        .await
        .context("Failed to list registrations")?;

    if args.json {
        return output::json_pretty(&registrations);
    }

    if registrations.is_empty() {
        output::note("You are not registered for any events.");
        return Ok(());
    }

    for (i, registration) in registrations.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_ticket(registration);
        if registration.is_used {
            output::field("Checked in", registration.checked_in_at.as_deref().unwrap_or("yes"));
        }
    }
    Ok(())
}
