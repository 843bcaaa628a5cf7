//! # scanlog binary
//!
//! ```text
//! scanlog [--config <file>] [--yes] [--json] <command>
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use scanlog::commands::{self, Command};
use scanlog::{init_tracing, App, AppConfig, AppError, AutoConfirm, Confirm, StdinConfirm};

#[derive(Parser, Debug)]
#[command(name = "scanlog", version, about = "Barcode scan log with batches and spreadsheet export")]
struct Cli {
    /// Config file (default: platform config dir / scanlog.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print errors as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code(), "{}", e);
            if json {
                match serde_json::to_string(&e.payload()) {
                    Ok(payload) => eprintln!("{}", payload),
                    Err(_) => eprintln!("{}", e.user_message()),
                }
            } else {
                eprintln!("error: {}", e.user_message());
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load(cli.config)?;
    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };

    let mut app = App::open(config, confirm).await?;
    let result = commands::execute(cli.command, &mut app).await;
    app.close().await;
    result
}
