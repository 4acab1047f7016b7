mod common;

use common::row;
use price_tracker::models::RowIndicator;
use price_tracker::render::*;

#[test]
fn test_no_fetch_renders_nothing() {
    assert_eq!(comparison_view(None), ComparisonView::Nothing);
}

#[test]
fn test_empty_dataset_shows_no_data() {
    let view = comparison_view(Some(&[][..]));
    assert_eq!(view, ComparisonView::NoData);
    assert_eq!(view.to_string().trim(), NO_DATA_MESSAGE);
}

#[test]
fn test_all_zero_list_prices_show_no_comparable_data() {
    let rows = vec![row(0.0, 0), row(0.0, 1), row(0.0, 2)];
    let view = comparison_view(Some(rows.as_slice()));
    assert_eq!(view, ComparisonView::NoComparableData);
    assert_eq!(view.to_string().trim(), NO_COMPARABLE_DATA_MESSAGE);
}

#[test]
fn test_one_nonzero_list_price_renders_table() {
    let rows = vec![row(0.0, 0), row(3400.0, 1)];
    match comparison_view(Some(rows.as_slice())) {
        ComparisonView::Table(table) => assert_eq!(table.len(), 2),
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn test_table_rows_match_dataset() {
    let mut second = row(3300.0, 2);
    second.own_location = "Marmaris".to_string();
    second.price_difference = -25.0;
    let rows = vec![row(3400.0, 0), row(3400.0, 1), second];

    let ComparisonView::Table(table) = comparison_view(Some(rows.as_slice())) else {
        panic!("expected table");
    };
    assert_eq!(table.len(), rows.len());

    assert_eq!(table[0].indicator, RowIndicator::Ok);
    assert_eq!(table[1].indicator, RowIndicator::Alert);
    assert_eq!(table[2].indicator, RowIndicator::Warning);

    let cells = &table[2].cells;
    assert_eq!(cells[0], "01.06.2024 - 08.06.2024");
    assert_eq!(cells[1], "Marmaris");
    assert_eq!(cells[2], "Fethiye");
    assert_eq!(cells[3], "3200");
    assert_eq!(cells[4], "3050.5");
    assert_eq!(cells[5], "3300");
    assert_eq!(cells[6], "Early booking");
    assert_eq!(cells[7], "10%");
    assert_eq!(cells[8], "20%");
    assert_eq!(cells[9], "610");
    assert_eq!(cells[10], "-25");
}

#[test]
fn test_table_text_has_header_rule_and_one_line_per_row() {
    let rows = vec![row(3400.0, 0), row(3400.0, 1)];
    let text = comparison_view(Some(rows.as_slice())).to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2 + rows.len());
    assert!(lines[0].starts_with("Date"));
    assert!(lines[0].ends_with("Status"));
    assert!(lines[1].starts_with("---"));
    assert!(lines[2].contains("Gocek"));
    assert!(lines[2].ends_with("● ok"));
    assert!(lines[3].ends_with("● alert"));
}
