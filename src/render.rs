use chrono::{DateTime, NaiveDateTime};
use std::fmt;

use crate::config::{own_vessel, OwnVessel};
use crate::models::{ComparisonRow, Competitor, CompetitorVessel, DailyStatus, RowIndicator};
use crate::panel::BotViewModel;

pub const COMPARISON_HEADERS: [&str; 12] = [
    "Date",
    "Our Location",
    "Competitor Location",
    "Our Price",
    "Competitor Price",
    "Competitor List Price",
    "Discount Type",
    "Discount %",
    "Commission %",
    "Commission",
    "Difference",
    "Status",
];

pub const NO_DATA_MESSAGE: &str = "No data for the selected date";
pub const NO_COMPARABLE_DATA_MESSAGE: &str = "No comparable data for the selected boats";

/// What the comparison area of a panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonView {
    /// No fetch has completed yet.
    Nothing,
    NoData,
    NoComparableData,
    Table(Vec<TableRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: [String; 11],
    pub indicator: RowIndicator,
}

impl TableRow {
    pub fn from_row(row: &ComparisonRow) -> Self {
        Self {
            cells: [
                row.date.clone(),
                row.own_location.clone(),
                row.competitor_location.clone(),
                row.own_price.to_string(),
                row.competitor_price.to_string(),
                row.competitor_list_price.to_string(),
                row.discount_type.clone(),
                row.discount_percentage.clone(),
                row.commission_percentage.clone(),
                row.commission.to_string(),
                row.price_difference.to_string(),
            ],
            indicator: row.indicator(),
        }
    }
}

/// `None` means no fetch has completed.
pub fn comparison_view(dataset: Option<&[ComparisonRow]>) -> ComparisonView {
    let Some(rows) = dataset else {
        return ComparisonView::Nothing;
    };
    if rows.is_empty() {
        return ComparisonView::NoData;
    }
    if rows.iter().all(|r| r.competitor_list_price == 0.0) {
        return ComparisonView::NoComparableData;
    }
    ComparisonView::Table(rows.iter().map(TableRow::from_row).collect())
}

impl fmt::Display for ComparisonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonView::Nothing => Ok(()),
            ComparisonView::NoData => writeln!(f, "{}", NO_DATA_MESSAGE),
            ComparisonView::NoComparableData => writeln!(f, "{}", NO_COMPARABLE_DATA_MESSAGE),
            ComparisonView::Table(rows) => write_table(f, rows),
        }
    }
}

fn indicator_cell(indicator: RowIndicator) -> String {
    format!("● {}", indicator.label())
}

fn write_table(f: &mut fmt::Formatter<'_>, rows: &[TableRow]) -> fmt::Result {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut cells = r.cells.to_vec();
            cells.push(indicator_cell(r.indicator));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = COMPARISON_HEADERS.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header: Vec<String> = COMPARISON_HEADERS.iter().map(|h| h.to_string()).collect();
    write_line(f, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_line(f, &rule, &widths)?;
    for cells in &body {
        write_line(f, cells, &widths)?;
    }
    Ok(())
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = w))
        .collect();
    writeln!(f, "{}", padded.join(" | ").trim_end())
}

/// Backend timestamps as `dd.MM.yyyy HH:mm`, or verbatim when unparseable.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%d.%m.%Y %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, pattern) {
            return ts.format("%d.%m.%Y %H:%M").to_string();
        }
    }
    raw.to_string()
}

pub fn render_status(bot_name: &str, view: &BotViewModel, daily: Option<&DailyStatus>) -> String {
    let badge = if view.status.is_running() {
        "running"
    } else {
        "stopped"
    };
    let mut out = format!("{} [{}]", bot_name, badge);
    if let Some(last) = &view.last_run {
        out.push_str(&format!("  last run: {}", format_timestamp(last)));
    }
    if let Some(next) = &view.next_run {
        out.push_str(&format!("  next run: {}", format_timestamp(next)));
    }
    out.push('\n');

    if let Some(daily) = daily {
        out.push_str(&format!("  daily status: {}", daily.status));
        if let Some(date) = &daily.last_update_date {
            out.push_str(&format!(" (updated {})", date));
        }
        out.push('\n');
    }
    out
}

pub fn render_selections(view: &BotViewModel) -> String {
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let own = match view.selected_own_vessel.as_deref() {
        Some(id) => match own_vessel(id) {
            Some(v) => format!("{} ({})", v.name, v.id),
            None => id.to_string(),
        },
        None => "-".to_string(),
    };
    format!(
        "  date: {}\n  competitor: {}\n  competitor vessel: {}\n  own vessel: {}\n",
        view.date
            .map(|d| d.format("%d.%m.%Y").to_string())
            .unwrap_or_else(|| "-".to_string()),
        or_dash(&view.selected_competitor),
        or_dash(&view.selected_competitor_vessel),
        own,
    )
}

pub fn render_competitors(competitors: &[Competitor]) -> String {
    competitors
        .iter()
        .map(|c| format!("{}  {}\n", c.competitor_name, c.click_text))
        .collect()
}

pub fn render_competitor_vessels(vessels: &[CompetitorVessel]) -> String {
    vessels
        .iter()
        .map(|v| format!("{}  {}\n", v.id, v.name))
        .collect()
}

pub fn render_own_vessels(vessels: &[OwnVessel]) -> String {
    vessels
        .iter()
        .map(|v| format!("{}  {}\n", v.id, v.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_rfc3339() {
        assert_eq!(format_timestamp("2024-06-01T14:30:00Z"), "01.06.2024 14:30");
    }

    #[test]
    fn test_format_timestamp_naive() {
        assert_eq!(format_timestamp("2024-06-01T09:05:12.345"), "01.06.2024 09:05");
    }

    #[test]
    fn test_format_timestamp_passthrough() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_nothing_renders_empty() {
        assert_eq!(ComparisonView::Nothing.to_string(), "");
    }

    #[test]
    fn test_status_badge_unknown_reads_stopped() {
        let view = BotViewModel::default();
        assert!(render_status("MMK", &view, None).starts_with("MMK [stopped]"));
    }
}
