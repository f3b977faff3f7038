//! Optica CLI - database migrations and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! optica-cli migrate storefront
//!
//! # Delete expired session records
//! optica-cli sessions purge
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "optica-cli")]
#[command(author, version, about = "Optica CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Session store maintenance
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Delete expired session records
    Purge,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
        },
        Commands::Sessions { action } => match action {
            SessionAction::Purge => commands::sessions::purge().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_migrate_storefront() {
        let cli = Cli::try_parse_from(["optica-cli", "migrate", "storefront"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate {
                target: MigrateTarget::Storefront
            })
        ));
    }

    #[test]
    fn test_unknown_target_rejected() {
        assert!(Cli::try_parse_from(["optica-cli", "migrate", "admin"]).is_err());
    }
}
