//! # CLI Commands
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (Command enum + dispatch)
//! ├── entries.rs   ◄─── add, list, edit, remove, scan
//! ├── batches.rs   ◄─── close, batches, restore, delete-batch, export, clear
//! └── settings.rs  ◄─── header, mode, status, config
//! ```
//!
//! Positions on the command line are 1-based, as printed by `list`.

pub mod batches;
pub mod entries;
pub mod settings;

use clap::Subcommand;

use scanlog_core::{CoreError, HeaderField, LedgerField, ScanMode};

use crate::error::AppResult;
use crate::App;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add an entry by hand (merges with an existing code)
    Add {
        code: String,
        /// Quantity, blank = 1
        #[arg(short, long, default_value = "")]
        qty: String,
        /// Unit price, blank = 0
        #[arg(short, long, default_value = "")]
        price: String,
    },

    /// Show the current entries
    List,

    /// Change the quantity or price of an entry
    Edit {
        /// Position as shown by `list`
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
        field: LedgerField,
        value: String,
    },

    /// Remove an entry
    Remove {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
    },

    /// Set a header field (date, store, discount); no value clears it
    Header {
        field: HeaderField,
        value: Option<String>,
    },

    /// Move the current entries into a new batch
    Close,

    /// List closed batches
    Batches,

    /// Replace the current entries with a copy of a batch
    Restore { id: u64 },

    /// Delete a batch permanently
    DeleteBatch { id: u64 },

    /// Write a spreadsheet of the current entries or of a batch
    Export {
        #[arg(long)]
        batch: Option<u64>,
    },

    /// Clear entries, batches and header fields
    Clear,

    /// Show or set the scan mode (1d, 2d, all)
    Mode { mode: Option<ScanMode> },

    /// Read scanned codes from stdin, one per line, until EOF
    Scan,

    /// Show scanner state and totals
    Status,

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Runs one command against an opened application.
pub async fn execute(command: Command, app: &mut App) -> AppResult<()> {
    match command {
        Command::Add { code, qty, price } => entries::add(app, &code, &qty, &price).await,
        Command::List => {
            entries::list(app);
            Ok(())
        }
        Command::Edit {
            position,
            field,
            value,
        } => entries::edit(app, to_index(position)?, field, &value).await,
        Command::Remove { position } => entries::remove(app, to_index(position)?).await,
        Command::Scan => entries::scan(app).await,
        Command::Close => batches::close(app).await,
        Command::Batches => {
            batches::list(app);
            Ok(())
        }
        Command::Restore { id } => batches::restore(app, id).await,
        Command::DeleteBatch { id } => batches::delete(app, id).await,
        Command::Export { batch } => batches::export(app, batch),
        Command::Clear => batches::clear(app).await,
        Command::Header { field, value } => {
            settings::header(app, field, value.as_deref().unwrap_or("")).await
        }
        Command::Mode { mode } => settings::mode(app, mode).await,
        Command::Status => settings::status(app).await,
        Command::Config { save } => settings::config(app, save),
    }
}

fn to_index(position: u64) -> AppResult<usize> {
    position
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| CoreError::EntryNotFound(0).into())
}
