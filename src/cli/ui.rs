use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned cell for an amount in ml. NaN is flagged in red.
pub fn amount_cell(amount: f64) -> Cell {
    if amount.is_nan() {
        return Cell::new("NaN")
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right);
    }
    Cell::new(format!("{amount}")).set_alignment(CellAlignment::Right)
}

/// Creates a cell for a normalized rate with color coding.
///
/// A missing rate means no time elapsed between the paired entries.
pub fn rate_cell(rate: Option<f64>) -> Cell {
    match rate {
        None => na_cell(),
        Some(r) if r.is_nan() => Cell::new("NaN")
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right),
        Some(r) if r < 0.0 => Cell::new(format!("{r}"))
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right),
        Some(r) => Cell::new(format!("{r}"))
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right),
    }
}

/// Creates a dimmed cell for "N/A" values.
pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Renders a horizontal gauge `width` characters wide.
pub fn gauge(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}]",
        style("#".repeat(filled)).cyan(),
        "-".repeat(width - filled)
    )
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
