//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Teams API - team listing and creation over session cookies
#[derive(Parser, Debug)]
#[command(name = "teams-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage session tokens
    Session(SessionArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the session command
#[derive(Parser, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Session actions
#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Print a session cookie for an existing user
    Issue {
        /// Email address of the user
        #[arg(long)]
        email: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_session_issue() {
        let cli = Cli::parse_from(["teams-api", "session", "issue", "--email", "ada@example.com"]);
        match cli.command {
            Commands::Session(SessionArgs {
                action: SessionAction::Issue { email },
            }) => assert_eq!(email, "ada@example.com"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parses_migrate_with_global_verbose() {
        let cli = Cli::parse_from(["teams-api", "migrate", "status", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs {
                action: MigrateAction::Status
            })
        ));
    }
}
