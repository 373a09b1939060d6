use super::ui;
use crate::core::observation::format_timestamp;
use crate::core::rate::{PairingMode, RatePoint, RatePolicy, compute_rate_series};
use crate::core::volume::{AmountPoint, amount_series};
use crate::store::EntryStore;
use anyhow::Result;
use comfy_table::Cell;
use tracing::debug;

/// Prints the amount-over-time series followed by the rate series.
pub fn run(store: &dyn EntryStore, policy: &RatePolicy) -> Result<()> {
    let entries = store.load()?;
    if entries.is_empty() {
        println!("No entries yet");
        return Ok(());
    }
    debug!("Rendering series for {} entries with {:?}", entries.len(), policy);

    println!("{}", render_amounts(&amount_series(&entries)));
    ui::print_separator();
    println!(
        "{}",
        render_rates(&compute_rate_series(&entries, policy), policy)
    );
    Ok(())
}

pub fn render_amounts(points: &[AmountPoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date & Time"),
        ui::header_cell("Fluid (ml)"),
    ]);
    for point in points {
        table.add_row(vec![
            Cell::new(format_timestamp(&point.timestamp)),
            ui::amount_cell(point.amount),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Fluid Over Time", ui::StyleType::Title),
        table
    )
}

pub fn render_rates(points: &[RatePoint], policy: &RatePolicy) -> String {
    let title = ui::style_text("Fluid Intake Rate", ui::StyleType::Title);
    let description = ui::style_text(&describe(policy), ui::StyleType::Subtle);

    if points.is_empty() {
        return format!(
            "{title}\n{description}\n\nNot enough entries to calculate a rate (need at least {}).",
            policy.mode.minimum_entries()
        );
    }

    let unit = format!("ml per {} hours", policy.mode.normalization_hours());
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date & Time"),
        ui::header_cell(&format!("Rate ({unit})")),
    ]);
    for point in points {
        table.add_row(vec![
            Cell::new(format_timestamp(&point.timestamp)),
            ui::rate_cell(point.rate),
        ]);
    }

    format!("{title}\n{description}\n\n{table}")
}

fn describe(policy: &RatePolicy) -> String {
    let pairing = match policy.mode {
        PairingMode::Adjacent => "each entry against the previous one".to_string(),
        PairingMode::AdjacentLag2 => "each entry against the one two steps back".to_string(),
        PairingMode::SlidingWindow { window_hours } => {
            format!("each entry against the earliest one within {window_hours}h")
        }
    };
    match policy.suppress_hours {
        Some(hours) => format!("Comparing {pairing}, hiding the first {hours}h"),
        None => format!("Comparing {pairing}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn hour(h: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    #[test]
    fn test_render_rates_table() {
        console::set_colors_enabled(false);
        let entries = vec![
            Observation::new(hour(0), 100.0),
            Observation::new(hour(1), 150.0),
            Observation::new(hour(1), 160.0),
        ];
        let policy = RatePolicy::adjacent();
        let output = render_rates(&compute_rate_series(&entries, &policy), &policy);

        assert!(output.contains("Rate (ml per 24 hours)"));
        assert!(output.contains("1200"));
        assert!(output.contains("N/A"));
        assert!(output.contains("previous one"));
    }

    #[test]
    fn test_render_rates_when_empty() {
        console::set_colors_enabled(false);
        let policy = RatePolicy::adjacent_lag2().with_suppression(12.0);
        let output = render_rates(&[], &policy);
        assert!(output.contains("need at least 3"));
        assert!(output.contains("hiding the first 12h"));
    }

    #[test]
    fn test_render_amounts_and_window_unit() {
        console::set_colors_enabled(false);
        let points = vec![AmountPoint {
            timestamp: hour(3),
            amount: 275.0,
        }];
        let output = render_amounts(&points);
        assert!(output.contains("2024-01-01T03:00"));
        assert!(output.contains("275"));

        let policy = RatePolicy::sliding_window(48.0);
        let rates = vec![RatePoint {
            timestamp: hour(3),
            rate: Some(100.0),
        }];
        assert!(render_rates(&rates, &policy).contains("ml per 48 hours"));
    }
}
