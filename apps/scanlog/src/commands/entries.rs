//! Entry commands: add, list, edit, remove, scan.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use scanlog_core::LedgerField;

use crate::error::AppResult;
use crate::App;

pub async fn add(app: &mut App, code: &str, qty: &str, price: &str) -> AppResult<()> {
    app.controller.add_manual(code, qty, price).await?;
    if let Some((pos, entry)) = app
        .controller
        .entries()
        .iter()
        .enumerate()
        .find(|(_, e)| e.code == code.trim())
    {
        println!(
            "#{} {}  qty {}  price {}",
            pos + 1,
            entry.code,
            entry.quantity,
            entry.price
        );
    }
    Ok(())
}

pub fn list(app: &App) {
    let entries = app.controller.entries();
    if entries.is_empty() {
        println!("No entries");
        return;
    }

    let width = entries.iter().map(|e| e.code.len()).max().unwrap_or(4).max(4);
    println!("{:>3}  {:<width$}  {:>8}  {:>10}", "#", "code", "quantity", "price");
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}  {:<width$}  {:>8}  {:>10}",
            i + 1,
            entry.code,
            entry.quantity,
            entry.price.to_string()
        );
    }

    let summary = app.controller.summary();
    println!(
        "{} entries, {} items, total {}",
        summary.entries, summary.total_quantity, summary.total_value
    );
}

pub async fn edit(app: &mut App, index: usize, field: LedgerField, value: &str) -> AppResult<()> {
    app.controller.edit_entry(index, field, value).await?;
    if let Some(entry) = app.controller.entries().get(index) {
        println!(
            "#{} {}  qty {}  price {}",
            index + 1,
            entry.code,
            entry.quantity,
            entry.price
        );
    }
    Ok(())
}

pub async fn remove(app: &mut App, index: usize) -> AppResult<()> {
    if app.controller.remove_entry(index).await? {
        println!("Removed #{}", index + 1);
    } else {
        println!("Cancelled");
    }
    Ok(())
}

/// Keyboard-wedge scanning: every stdin line is a decoded code.
pub async fn scan(app: &mut App) -> AppResult<()> {
    app.controller.start_scanning()?;
    println!("{}", app.controller.status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut recorded = 0usize;

    while let Some(line) = lines.next_line().await? {
        let code = line.trim();
        if code.is_empty() {
            continue;
        }
        if !app.feeds.push(code) {
            debug!(code = %code, "No engine running, code dropped");
            continue;
        }
        if app.controller.pump_pending().await? > 0 {
            recorded += 1;
            if let Some(entry) = app.controller.entries().iter().find(|e| e.code == code) {
                println!("+ {}  (qty {})", entry.code, entry.quantity);
            }
        }
    }

    app.controller.stop_scanning();
    info!(recorded, "Scan input finished");
    println!("{} scans recorded", recorded);
    Ok(())
}
