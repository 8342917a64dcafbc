use anyhow::Context;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Operate the bookshelf service.
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    /// Override the database URL from configuration
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Load configuration and verify the database is reachable
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bookshelf_app::serve(settings).await,
        Command::Migrate => {
            let applied = bookshelf_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations applied");
            println!("applied {} migration(s)", applied);
            Ok(())
        }
        Command::Check => {
            let pool = bookshelf_db::connect(&settings.database)
                .await
                .context("database unreachable")?;
            bookshelf_db::ping(&pool).await?;
            pool.close().await;
            println!(
                "configuration ok (env={}, database={})",
                settings.environment.as_str(),
                settings.database.url
            );
            Ok(())
        }
    }
}
