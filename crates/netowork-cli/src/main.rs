use clap::{Parser, Subcommand};
use netowork_auth::maintenance::Maintenance;
use netowork_auth::store::Store;
use netowork_auth::{Config, Migrator, logging};
use sea_orm_migration::MigratorTrait;

#[derive(Parser)]
#[command(name = "netowork")]
#[command(about = "Operational tasks for the Netowork auth backend")]
#[command(version)]
struct Cli {
    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },
    /// Delete stale unverified users and expired password reset tokens once
    Sweep,
}

#[derive(Subcommand)]
enum DbCommands {
    /// Run pending migrations
    Migrate,
    /// List applied and pending migrations
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.json_logs {
        logging::init_logging_json_with_level(&cli.log_level);
    } else {
        logging::init_logging_with_level(&cli.log_level);
    }

    let config = Config::from_env()?;
    let db = netowork_auth::db::connect(&config).await?;

    match cli.command {
        Commands::Db { action } => match action {
            DbCommands::Migrate => {
                println!("Running pending migrations...");
                Migrator::up(&db, None).await?;
                println!("Migrations complete.");
            }
            DbCommands::Status => {
                for migration in Migrator::get_applied_migrations(&db).await? {
                    println!("  applied  {}", migration.name());
                }
                for migration in Migrator::get_pending_migrations(&db).await? {
                    println!("  pending  {}", migration.name());
                }
            }
        },
        Commands::Sweep => {
            let maintenance = Maintenance::from_store(&Store::new(db));
            let report = maintenance.run().await;

            println!(
                "Deleted unverified users: {}",
                report.deleted_users.map_or("failed".to_string(), |n| n.to_string())
            );
            println!(
                "Deleted expired reset tokens: {}",
                report
                    .deleted_reset_tokens
                    .map_or("failed".to_string(), |n| n.to_string())
            );

            if !report.is_success() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
