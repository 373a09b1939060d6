use super::ui;
use crate::core::Observation;
use crate::core::observation::format_timestamp;
use crate::core::volume::{BagLevel, DEFAULT_MARK_STEP, latest, measurement_marks};
use crate::store::EntryStore;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

const GAUGE_WIDTH: usize = 40;

pub fn run(store: &dyn EntryStore, capacity: f64) -> Result<()> {
    let entries = store.load()?;
    println!("{}", render_bag(&entries, capacity));
    Ok(())
}

/// Renders the fill level of the container from the latest entry.
pub fn render_bag(entries: &[Observation], capacity: f64) -> String {
    let (Some(level), Some(last)) = (BagLevel::from_entries(entries, capacity), latest(entries))
    else {
        return "No entries yet".to_string();
    };

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Mark (ml)"), ui::header_cell("")]);
    for mark in measurement_marks(capacity, DEFAULT_MARK_STEP).iter().rev() {
        let reached = level.displayed() >= *mark;
        table.add_row(vec![
            Cell::new(format!("{mark}")).set_alignment(CellAlignment::Right),
            Cell::new(if reached { "■" } else { "" }),
        ]);
    }

    let amount_style = if level.raw.is_nan() || level.raw < 0.0 || level.is_overflowing() {
        ui::StyleType::Error
    } else {
        ui::StyleType::TotalValue
    };

    let mut output = format!(
        "{}\n\n{}\n\n{} {} / {}ml {}\n{}",
        ui::style_text("Fluid Bag", ui::StyleType::Title),
        table,
        ui::gauge(level.fill_percentage(), GAUGE_WIDTH),
        ui::style_text(&format!("{}ml", level.displayed()), amount_style),
        capacity,
        ui::style_text(
            &format!("({:.1}%)", level.fill_percentage()),
            ui::StyleType::Subtle
        ),
        ui::style_text(&format_timestamp(&last.timestamp), ui::StyleType::Subtle),
    );

    if level.displayed() != level.raw || level.raw.is_nan() {
        output.push_str(&format!(
            "\n{} net amount is {}ml",
            ui::style_text("Warning:", ui::StyleType::Error),
            level.raw
        ));
    }
    output
}
