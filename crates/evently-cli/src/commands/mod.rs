//! Subcommand implementations.

mod call;
mod check_in;
mod events;
mod login;
mod logout;
mod my_registrations;
mod refresh_token;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use evently_client::Client;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in with a username and password
    Login(login::LoginArgs),

    /// End the session and forget the stored tokens
    Logout(logout::LogoutArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Exchange the refresh token for a new access token
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Browse events and manage registrations
    Events(events::EventsCommand),

    /// List your tickets
    MyRegistrations(my_registrations::MyRegistrationsArgs),

    /// Check a ticket in (organizers and admins)
    CheckIn(check_in::CheckInArgs),

    /// Send a raw API request through the session
    Call(call::CallArgs),
}

pub async fn handle(command: Command, client: &Client) -> Result<()> {
    match command {
        Command::Login(args) => login::run(args, client).await,
        Command::Logout(args) => logout::run(args, client),
        Command::Whoami(args) => whoami::run(args, client).await,
        Command::RefreshToken(args) => refresh_token::run(args, client).await,
        Command::Events(cmd) => events::handle(cmd, client).await,
        Command::MyRegistrations(args) => my_registrations::run(args, client).await,
        Command::CheckIn(args) => check_in::run(args, client).await,
        Command::Call(args) => call::run(args, client).await,
    }
}
