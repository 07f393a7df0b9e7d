//! Krishop CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! krishop migrate
//!
//! # Create a user
//! krishop user create -u alice -e alice@example.com -p 'correct horse'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create a marketplace user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "krishop")]
#[command(author, version, about = "Krishop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage marketplace users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Username (2-20 characters)
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
            } => {
                commands::user::create(&username, &email, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "krishop", "user", "create", "-u", "alice", "-e", "a@example.com", "-p", "password1",
        ])
        .unwrap();

        match cli.command {
            Commands::User {
                action:
                    UserAction::Create {
                        username,
                        email,
                        password,
                    },
            } => {
                assert_eq!(username, "alice");
                assert_eq!(email, "a@example.com");
                assert_eq!(password, "password1");
            }
            Commands::Migrate => panic!("parsed as migrate"),
        }
    }

    #[test]
    fn test_user_create_requires_all_fields() {
        assert!(Cli::try_parse_from(["krishop", "user", "create", "-u", "alice"]).is_err());
    }
}
