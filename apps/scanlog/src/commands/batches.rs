//! Batch commands: close, batches, restore, delete-batch, export, clear.

use scanlog_core::BatchId;

use crate::error::AppResult;
use crate::App;

pub async fn close(app: &mut App) -> AppResult<()> {
    let outcome = app.controller.close_batch().await?;
    println!("Closed batch {}", outcome.id);
    if let Some(path) = outcome.exported {
        println!("Exported {}", path.display());
    }
    Ok(())
}

pub fn list(app: &App) {
    let batches = app.controller.batches();
    if batches.is_empty() {
        println!("No batches");
        return;
    }
    for batch in batches {
        println!(
            "Batch {}  {}  ({})  discount {}%  [{} items, qty {}, net {}]",
            batch.id,
            batch.header.store,
            batch.header.date,
            batch.header.discount,
            batch.items.len(),
            batch.total_quantity(),
            batch.net_total()
        );
    }
}

pub async fn restore(app: &mut App, id: u64) -> AppResult<()> {
    if app.controller.restore_batch(BatchId::new(id)).await? {
        println!(
            "Restored batch {} ({} entries)",
            id,
            app.controller.entries().len()
        );
    } else {
        println!("Cancelled");
    }
    Ok(())
}

pub async fn delete(app: &mut App, id: u64) -> AppResult<()> {
    if app.controller.delete_batch(BatchId::new(id)).await? {
        println!("Deleted batch {}", id);
    } else {
        println!("Cancelled");
    }
    Ok(())
}

pub fn export(app: &App, batch: Option<u64>) -> AppResult<()> {
    let path = match batch {
        Some(id) => app.controller.export_batch(BatchId::new(id))?,
        None => app.controller.export_current()?,
    };
    println!("Exported {}", path.display());
    Ok(())
}

pub async fn clear(app: &mut App) -> AppResult<()> {
    if app.controller.clear_all().await? {
        println!("Cleared");
    } else {
        println!("Cancelled");
    }
    Ok(())
}
