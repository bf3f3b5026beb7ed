use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use mimcal_cli::admin;
use mimcal_cli::seeder::{self, SeedConfig};
use mimcal_config::{DatabaseConfig, JwtConfig};
use mimcal_db::init_db_pool;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mimcal-cli")]
#[command(about = "Mimcal CLI - Administrative tools for Mimcal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account
    CreateUser {
        /// Username (prompted if not provided)
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print a bearer token for an existing user
    IssueToken {
        /// Username to issue the token for
        username: String,
    },
    /// Print every user's override and effective level on a schedule
    Access {
        /// Schedule id
        schedule_id: Uuid,
    },
    /// Seed the database with fake users, schedules, overrides and events
    Seed {
        /// Number of users to create
        #[arg(short = 'u', long, default_value = "10")]
        users: usize,

        /// Number of schedules per user
        #[arg(long, default_value = "2")]
        schedules: usize,

        /// Number of explicit overrides per schedule
        #[arg(long, default_value = "3")]
        overrides: usize,

        /// Number of events per schedule
        #[arg(long, default_value = "8")]
        events: usize,
    },
    /// Remove seeded users and everything they own
    ClearSeed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = init_db_pool(&DatabaseConfig::from_env())
        .await
        .context("failed to connect to database")?;

    match cli.command {
        Commands::CreateUser { username, password } => {
            let username = match username {
                Some(username) => username,
                None => Input::new().with_prompt("Username").interact_text()?,
            };
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()?,
            };

            let id = admin::create_user(&pool, &username, &password).await?;
            println!("\n✅ User created successfully!");
            println!("   Username: {username}");
            println!("   Id: {id}");
        }
        Commands::IssueToken { username } => {
            let token = admin::issue_token(&pool, &username, &JwtConfig::from_env()).await?;
            println!("{token}");
        }
        Commands::Access { schedule_id } => {
            let rows = admin::schedule_access_table(&pool, schedule_id).await?;
            println!("{:<32} {:<24} EFFECTIVE", "USERNAME", "OVERRIDE");
            for row in rows {
                let override_level = row
                    .override_level
                    .map(|level| format!("{} ({})", level.value(), level.label()))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<32} {:<24} {} ({})",
                    row.username,
                    override_level,
                    row.effective_level.value(),
                    row.effective_level.label()
                );
            }
        }
        Commands::Seed {
            users,
            schedules,
            overrides,
            events,
        } => {
            let config = SeedConfig {
                num_users: users,
                schedules_per_user: schedules,
                overrides_per_schedule: overrides,
                events_per_schedule: events,
            };
            seeder::seed_all(&pool, config).await?;
        }
        Commands::ClearSeed => {
            let deleted = seeder::clear_seed(&pool).await?;
            println!("✅ Removed {deleted} seeded users and their data");
        }
    }

    Ok(())
}
