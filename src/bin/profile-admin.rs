//! Biodata Service Administration CLI
//!
//! Operates directly on the database for tasks that have no acting admin to
//! authorize them over HTTP, most importantly granting the first admin role.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;

use biodata_service::{
    config,
    database::{DatabaseConfig, PgProfileStore, ProfileStore},
    models::Role,
    service::UserService,
    utils::{
        error::{AppResult, IntoAppError},
        validation::normalize_email,
    },
};

/// Biodata service administration CLI
#[derive(Parser)]
#[command(name = "profile-admin", about = "Biodata service administration CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Give a user the admin role, creating the account if needed
    GrantAdmin(EmailArgs),
    /// Take the admin role away from a user
    RevokeAdmin(EmailArgs),
    /// Set or clear a user's premium flag (also applied to their biodata)
    SetPremium(SetPremiumArgs),
    /// List all users
    ListUsers,
    /// Print dashboard counts
    Stats,
}

#[derive(Args)]
struct EmailArgs {
    /// Account email
    email: String,
}

#[derive(Args)]
struct SetPremiumArgs {
    /// Account email
    email: String,

    /// New premium flag (true or false)
    #[arg(action = clap::ArgAction::Set)]
    premium: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    // Only the database settings are needed here
    let database = config::DatabaseConfig::from_env()?;
    let pool = DatabaseConfig::from(&database)
        .connect_and_migrate()
        .await
        .into_app_error("Failed to connect to database")?;

    let store: Arc<dyn ProfileStore> = Arc::new(PgProfileStore::new(pool));
    let users = UserService::new(store.clone());

    run(cli.command, store.as_ref(), &users).await?;
    Ok(())
}

async fn run(command: Commands, store: &dyn ProfileStore, users: &UserService) -> AppResult<()> {
    match command {
        Commands::GrantAdmin(args) => {
            let user = users.provision_role(&args.email, Role::Admin).await?;
            println!("✅ {} is now an admin", user.email);
        }
        Commands::RevokeAdmin(args) => {
            let user = users.provision_role(&args.email, Role::User).await?;
            println!("✅ {} is now a regular user", user.email);
        }
        Commands::SetPremium(args) => {
            let user = users
                .apply_premium(&normalize_email(&args.email), args.premium)
                .await?;
            println!("✅ Premium for {} set to {}", user.email, user.is_premium);
        }
        Commands::ListUsers => {
            let all = store.list_users().await?;
            println!("📋 {} user(s)", all.len());
            for user in all {
                println!(
                    "   {:<40} {:<6} premium={} created={}",
                    user.email,
                    user.role.as_str(),
                    user.is_premium,
                    user.created_at.format("%Y-%m-%d")
                );
            }
        }
        Commands::Stats => {
            let stats = store.dashboard_stats().await?;
            println!("📊 Dashboard");
            println!("   Users:              {}", stats.total_users);
            println!(
                "   Biodatas:           {} ({} male, {} female, {} premium)",
                stats.total_biodatas,
                stats.male_biodatas,
                stats.female_biodatas,
                stats.premium_biodatas
            );
            println!(
                "   Contact requests:   {} pending, {} approved, {} rejected",
                stats.pending_contact_requests,
                stats.approved_contact_requests,
                stats.rejected_contact_requests
            );
        }
    }

    Ok(())
}
