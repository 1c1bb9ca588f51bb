//! HuertoHogar CLI - session migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! hh-cli migrate storefront
//!
//! # Create the admin session table
//! hh-cli migrate admin
//!
//! # Both
//! hh-cli migrate all
//!
//! # Load the demo catalog into the product service
//! hh-cli seed products
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hh-cli")]
#[command(author, version, about = "HuertoHogar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Load demo data into the external services
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Storefront session table (`tower_sessions.session`)
    Storefront,
    /// Admin session table (`admin.session`)
    Admin,
    /// Storefront and admin
    All,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// POST the built-in catalog to the product service
    Products {
        /// List what would be created without calling the service
        #[arg(long)]
        dry_run: bool,
    },
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

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { dry_run } => commands::seed::products(dry_run).await?,
        },
    }
    Ok(())
}
