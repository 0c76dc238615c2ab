//! Event commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use evently_client::Client;
use evently_core::{Event, Registration, Role};

use crate::context;
use crate::output;

#[derive(Args, Debug)]
pub struct EventsCommand {
    #[command(subcommand)]
    pub command: EventsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum EventsSubcommand {
    /// List events
    List(ListArgs),

    /// Show one event
    Get(EventArgs),

    /// Register for an event
    Register(EventArgs),

    /// Cancel your registration for an event
    Cancel(EventArgs),

    /// List everyone registered for an event (organizers and admins)
    Registrations(RegistrationsArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EventArgs {
    /// Event id
    pub id: u64,
}

#[derive(Args, Debug)]
pub struct RegistrationsArgs {
    /// Event id
    pub id: u64,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle(cmd: EventsCommand, client: &Client) -> Result<()> {
    match cmd.command {
        EventsSubcommand::List(args) => list(args, client).await,
        EventsSubcommand::Get(args) => get(args, client).await,
        EventsSubcommand::Register(args) => register(args, client).await,
        EventsSubcommand::Cancel(args) => cancel(args, client).await,
        EventsSubcommand::Registrations(args) => registrations(args, client).await,
    }
}

async fn list(args: ListArgs, client: &Client) -> Result<()> {
    let events = client
        .events()
        .list_events()
        .await
        .context("Failed to list events")?;

    if args.json {
        return output::json_pretty(&events);
    }

    if events.is_empty() {
        output::note("No events found.");
        return Ok(());
    }

    for event in &events {
        print_event_line(event);
    }
    Ok(())
}

fn print_event_line(event: &Event) {
    let when = event.date.as_deref().unwrap_or("-");
    let seats = match (event.seats_booked, event.capacity) {
        (Some(booked), Some(capacity)) => format!("{}/{}", booked, capacity),
        _ => String::new(),
    };
    let id = event.id.to_string();
    println!(
        "{:>5}  {}  {}  {}",
        id.as_str().bold(),
        when.dimmed(),
        event.title,
        seats.as_str().dimmed()
    );
}

async fn get(args: EventArgs, client: &Client) -> Result<()> {
    let event = client
        .events()
        .get_event(args.id)
        .await
        .with_context(|| format!("Failed to fetch event {}", args.id))?;

    output::json_pretty(&event)
}

async fn register(args: EventArgs, client: &Client) -> Result<()> {
    context::require_identity(client)?;

    let registration = client
        .events()
        .register(args.id)
        .await
        .with_context(|| format!("Failed to register for event {}", args.id))?;

    output::success(&format!("Registered for event {}", args.id));
    print_ticket(&registration);
    Ok(())
}

async fn cancel(args: EventArgs, client: &Client) -> Result<()> {
    context::require_identity(client)?;

    client
        .events()
        .cancel_registration(args.id)
        .await
        .with_context(|| format!("Failed to cancel registration for event {}", args.id))?;

    output::success(&format!("Registration for event {} cancelled", args.id));
    Ok(())
}

async fn registrations(args: RegistrationsArgs, client: &Client) -> Result<()> {
    context::require_role(client, &[Role::Organizer, Role::Admin])?;

    let registrations = client
        .events()
        .event_registrations(args.id)
        .await
        .with_context(|| format!("Failed to list registrations for event {}", args.id))?;

    if args.json {
        return output::json_pretty(&registrations);
    }

    if registrations.is_empty() {
        output::note("No registrations yet.");
        return Ok(());
    }

    for registration in &registrations {
        let who = registration
            .student_name
            .as_deref()
            .or(registration.student_email.as_deref())
            .unwrap_or("-");
        let state = if registration.is_used {
            "checked in".green()
        } else {
            "registered".normal()
        };
        println!(
            "{}  {}  {}",
            registration.public_id.as_deref().unwrap_or("-"),
            who,
            state
        );
    }
    Ok(())
}

pub(crate) fn print_ticket(registration: &Registration) {
    output::optional_field("Ticket", registration.public_id.as_deref());
    output::optional_field("Event", registration.event_title.as_deref());
    output::optional_field("Seat", registration.seat_number.as_deref());
    output::optional_field("Type", registration.ticket_type.as_deref());
    output::optional_field("Status", registration.status.as_deref());
}
