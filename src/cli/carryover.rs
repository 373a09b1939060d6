use super::ui;
use crate::core::config::AppConfig;
use crate::store::EntryStore;
use anyhow::{Result, bail};
use tracing::info;

/// Shows the standing carryover, or stores a new one when `value` is given.
///
/// Existing entries keep the carryover they were recorded with.
pub fn run(store: &dyn EntryStore, config: &AppConfig, value: Option<f64>) -> Result<()> {
    match value {
        Some(value) => {
            set(store, value)?;
            println!("Carryover set to {value}ml for new entries.");
        }
        None => {
            let (current, source) = current(store, config)?;
            println!(
                "Carryover: {} {}",
                ui::style_text(&format!("{current}ml"), ui::StyleType::TotalValue),
                ui::style_text(&format!("({source})"), ui::StyleType::Subtle)
            );
        }
    }
    Ok(())
}

pub fn set(store: &dyn EntryStore, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("Carryover must be a non-negative number, got {value}");
    }
    store.set_carryover(value)?;
    info!("Carryover set to {value}ml");
    Ok(())
}

/// The active carryover and where it came from.
pub fn current(store: &dyn EntryStore, config: &AppConfig) -> Result<(f64, &'static str)> {
    Ok(match store.carryover()? {
        Some(value) => (value, "stored"),
        None => (config.carryover, "config default"),
    })
}
