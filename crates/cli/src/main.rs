use anyhow::Context;
use clap::{Parser, Subcommand};

use bookstore_kernel::settings::Settings;

/// Administrative entrypoint for the BookStore service
#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create tables and serve the HTTP API (default)
    Serve,
    /// Create the registered tables and exit
    InitDb,
    /// Print the effective configuration as JSON
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load BookStore settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookstore_telemetry::init(&settings.telemetry)?;
            bookstore_app::run(settings).await
        }
        Command::InitDb => {
            bookstore_telemetry::init(&settings.telemetry)?;
            let app = bookstore_app::bootstrap(settings).await?;
            let tables: Vec<_> = app.registry.collect_tables().iter().map(|t| t.table).collect();
            tracing::info!(?tables, "tables ready");
            app.db.close().await;
            println!("created tables: {}", tables.join(", "));
            Ok(())
        }
        Command::ShowConfig => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
    }
}
