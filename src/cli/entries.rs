use super::ui;
use crate::core::Observation;
use crate::core::config::AppConfig;
use crate::core::observation::format_timestamp;
use crate::core::rate::sorted_chronologically;
use crate::store::EntryStore;
use anyhow::{Result, bail};
use chrono::{Local, NaiveDateTime, Timelike};
use comfy_table::Cell;
use tracing::{debug, info};

/// Records a new entry. The entered amount is added to the standing
/// carryover, which is snapshotted on the entry.
pub fn add(
    store: &dyn EntryStore,
    config: &AppConfig,
    entered: f64,
    at: Option<NaiveDateTime>,
) -> Result<Observation> {
    if !entered.is_finite() || entered < 0.0 {
        bail!("Fluid amount must be a non-negative number, got {entered}");
    }

    let timestamp = at.unwrap_or_else(current_minute);
    let carryover = store.carryover()?.unwrap_or(config.carryover);
    debug!("Recording {entered}ml at {timestamp} with carryover {carryover}ml");

    let entry = Observation::record(timestamp, entered, carryover);
    store.append(entry.clone())?;
    info!("Saved entry {entry}");
    Ok(entry)
}

fn current_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

pub fn list(store: &dyn EntryStore) -> Result<()> {
    let entries = store.load()?;
    println!("{}", render_entries(&entries));
    Ok(())
}

pub fn clear(store: &dyn EntryStore) -> Result<()> {
    let count = store.load()?.len();
    store.clear()?;
    info!("Cleared {count} entries");
    println!("Cleared {count} entries.");
    Ok(())
}

/// Renders the entry log in chronological order.
pub fn render_entries(entries: &[Observation]) -> String {
    if entries.is_empty() {
        return "No entries yet".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date & Time"),
        ui::header_cell("Amount (ml)"),
        ui::header_cell("Carryover (ml)"),
        ui::header_cell("Net (ml)"),
    ]);

    for entry in sorted_chronologically(entries) {
        table.add_row(vec![
            Cell::new(format_timestamp(&entry.timestamp)),
            ui::amount_cell(entry.amount),
            ui::amount_cell(entry.carryover),
            ui::amount_cell(entry.amount - entry.carryover),
        ]);
    }

    format!(
        "{}\n\n{}\n\n{} {}",
        ui::style_text("Previous Entries", ui::StyleType::Title),
        table,
        ui::style_text("Entries:", ui::StyleType::TotalLabel),
        ui::style_text(&entries.len().to_string(), ui::StyleType::TotalValue)
    )
}
