use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore-cli", version, about = "Run and manage the bookstore service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP until interrupted
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective configuration and exit
    CheckConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    match cli.command {
        Command::CheckConfig => {
            print_config(&settings);
            Ok(())
        }
        Command::Serve => block_on(&settings, bookstore_app::run(&settings)),
        Command::Migrate => block_on(&settings, async {
            let applied = bookstore_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {} migration(s)", applied);
            Ok(())
        }),
    }
}

fn print_config(settings: &Settings) {
    println!("environment: {:?}", settings.environment);
    println!("listen: {}", settings.server.bind_address());
    println!("database: {}", settings.database.url);
    match settings.server.request_timeout_ms {
        Some(timeout_ms) => println!("request timeout: {}ms", timeout_ms),
        None => println!("request timeout: none"),
    }
}

/// Initialize logging, then drive `task` on a fresh runtime.
fn block_on<F>(settings: &Settings, task: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    bookstore_telemetry::init(&settings.telemetry)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(task)
}
