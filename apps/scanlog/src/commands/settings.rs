//! Header, scan mode, status and configuration commands.

use scanlog_core::{HeaderField, ScanMode};
use scanlog_store::migrations::migration_status;

use crate::error::AppResult;
use crate::App;

pub async fn header(app: &mut App, field: HeaderField, value: &str) -> AppResult<()> {
    app.controller.set_header_field(field, value).await?;
    print_header(app);
    Ok(())
}

fn print_header(app: &App) {
    let header = app.controller.header();
    for (label, field) in [
        ("date", HeaderField::Date),
        ("store", HeaderField::Store),
        ("discount", HeaderField::Discount),
    ] {
        println!("{:<9} {}", label, header.get(field).unwrap_or("-"));
    }
}

pub async fn mode(app: &mut App, mode: Option<ScanMode>) -> AppResult<()> {
    if let Some(mode) = mode {
        app.controller.switch_mode(mode).await?;
    }
    println!("{}", app.controller.mode());
    Ok(())
}

pub async fn status(app: &App) -> AppResult<()> {
    app.db.health_check().await?;
    let (total, applied) = migration_status(app.db.pool()).await?;

    let summary = app.controller.summary();
    println!("{}", summary.status);
    println!("mode      {}", summary.mode);
    println!("camera    {}", summary.facing);
    println!(
        "entries   {} ({} items, total {})",
        summary.entries, summary.total_quantity, summary.total_value
    );
    println!("batches   {}", summary.batches);
    println!("store     ok (schema {}/{})", applied, total);
    print_header(app);
    Ok(())
}

pub fn config(app: &App, save: bool) -> AppResult<()> {
    let text = toml::to_string_pretty(&app.config)?;
    print!("{}", text);
    if save {
        let path = app.config.save(None)?;
        println!("# saved to {}", path.display());
    }
    Ok(())
}
