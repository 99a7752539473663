use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tabula_core::{
    BadgeColor, Cell, ColumnDescriptor, FilterConfig, FilterEntry, FilterMode, FilterOperator,
    FilterValue, MapRecord, SortSpec, Viewport,
};
use tabula_engine::{DataGrid, GridEvent, LayoutMode, PagingMode, SelectAllState};
use tabula_testing::{
    client_columns, client_filters, client_grid_config, client_records, init_test_logging,
    records_from_json,
};

type Event = GridEvent<MapRecord>;

#[fixture]
fn grid() -> DataGrid<MapRecord> {
    init_test_logging();
    let mut grid = DataGrid::new(client_columns(), client_filters(), client_grid_config())
        .expect("valid grid setup")
        .with_view_key("clients")
        .selectable(true);
    grid.set_data(client_records(23), None);
    grid
}

fn visible_ids(grid: &DataGrid<MapRecord>) -> Vec<String> {
    grid.visible_records().map(|r| r.get("id").unwrap().to_string()).collect()
}

fn ids(range: std::ops::RangeInclusive<i64>) -> Vec<String> {
    range.map(|i| i.to_string()).collect()
}

#[rstest]
fn test_client_paging_clamps_requests(mut grid: DataGrid<MapRecord>) {
    assert_eq!(grid.pagination().total_pages(), 3);
    assert_eq!(visible_ids(&grid), ids(1..=10));

    grid.set_page(99);
    assert_eq!(grid.pagination().page(), 3);
    assert_eq!(visible_ids(&grid), ids(21..=23));
    assert_eq!(
        grid.take_events(),
        vec![Event::PageChanged { page: 3, page_size: 10 }]
    );

    grid.set_page(0);
    assert_eq!(grid.pagination().page(), 1);

    // Already on page 1: nothing to announce
    grid.take_events();
    grid.set_page(1);
    assert!(grid.take_events().is_empty());
}

#[rstest]
fn test_sort_toggle_cycles_and_reorders(mut grid: DataGrid<MapRecord>) {
    grid.toggle_sort("balance");
    grid.toggle_sort("balance");
    assert_eq!(visible_ids(&grid), ids(14..=23).into_iter().rev().collect::<Vec<_>>());

    grid.toggle_sort("balance");
    grid.toggle_sort("name");
    assert_eq!(
        grid.take_events(),
        vec![
            Event::SortChanged(vec![SortSpec::ascending("balance")]),
            Event::SortChanged(vec![SortSpec::descending("balance")]),
            Event::SortChanged(vec![SortSpec::ascending("balance")]),
            Event::SortChanged(vec![SortSpec::ascending("name")]),
        ]
    );
}

#[rstest]
fn test_non_sortable_field_is_ignored(mut grid: DataGrid<MapRecord>) {
    grid.toggle_sort("actions");
    grid.toggle_sort("no_such_field");
    assert!(grid.sort().is_none());
    assert!(grid.take_events().is_empty());
}

#[rstest]
fn test_filter_change_resets_page_without_page_event(mut grid: DataGrid<MapRecord>) {
    grid.set_page(3);
    grid.take_events();

    grid.set_filter("status", Some(FilterValue::text("active")));
    assert_eq!(grid.pagination().page(), 1);
    assert_eq!(grid.pagination().total_items(), 8);
    assert_eq!(
        grid.take_events(),
        vec![Event::FiltersChanged(vec![FilterEntry::new(
            "status",
            FilterOperator::Equals,
            FilterValue::text("active"),
        )])]
    );
}

#[rstest]
fn test_empty_filter_value_clears_entry(mut grid: DataGrid<MapRecord>) {
    grid.set_filter("tier", Some(FilterValue::list(["gold"])));
    assert_eq!(grid.filter_entries().len(), 1);

    grid.set_filter("tier", Some(FilterValue::List(vec![])));
    assert!(grid.filter_entries().is_empty());
    assert_eq!(grid.pagination().total_items(), 23);

    let events = grid.take_events();
    assert_eq!(events.last(), Some(&Event::FiltersChanged(vec![])));
}

#[rstest]
fn test_page_size_change_resets_page(mut grid: DataGrid<MapRecord>) {
    grid.set_page(3);
    grid.take_events();

    grid.set_page_size(25);
    assert_eq!(grid.pagination().page(), 1);
    assert_eq!(grid.pagination().total_pages(), 1);
    assert_eq!(
        grid.take_events(),
        vec![Event::PageChanged { page: 1, page_size: 25 }]
    );
}

#[rstest]
fn test_select_all_then_deselect_one(mut grid: DataGrid<MapRecord>) {
    grid.set_data(client_records(5), None);
    grid.toggle_all(true);
    assert_eq!(grid.selected_records().len(), 5);
    assert_eq!(grid.select_all_state(), SelectAllState::All);

    grid.toggle_row(&"3".to_string());
    assert_eq!(grid.select_all_state(), SelectAllState::Some);
    assert_eq!(grid.selected_records().len(), 4);

    match grid.take_events().last() {
        Some(Event::SelectionChanged(selected)) => assert_eq!(selected.len(), 4),
        other => panic!("expected selection event, got {:?}", other),
    }
}

#[rstest]
fn test_new_data_clears_selection(mut grid: DataGrid<MapRecord>) {
    grid.toggle_all(true);
    grid.take_events();

    grid.set_data(client_records(5), None);
    assert!(grid.selected_records().is_empty());
    assert_eq!(grid.select_all_state(), SelectAllState::None);
    assert_eq!(grid.take_events(), vec![Event::SelectionChanged(vec![])]);
}

#[rstest]
fn test_rows_outside_the_page_cannot_be_selected(mut grid: DataGrid<MapRecord>) {
    grid.toggle_row(&"15".to_string());
    assert!(grid.selected_records().is_empty());
    assert!(grid.take_events().is_empty());
}

#[rstest]
fn test_row_click_emits_record(mut grid: DataGrid<MapRecord>) {
    grid.click_row(&"2".to_string());
    match grid.take_events().as_slice() {
        [Event::RowClicked(record)] => assert_eq!(record.get("name").unwrap().to_string(), "Globex"),
        other => panic!("unexpected events {:?}", other),
    }
}

#[rstest]
#[case(Viewport::Desktop, LayoutMode::Table, 6)]
#[case(Viewport::Tablet, LayoutMode::ReducedTable, 5)]
fn test_table_layouts(
    mut grid: DataGrid<MapRecord>,
    #[case] viewport: Viewport,
    #[case] mode: LayoutMode,
    #[case] columns: usize,
) {
    grid.set_viewport(viewport);
    let view = grid.render();
    assert_eq!(view.layout.mode, mode);
    assert_eq!(view.headers.len(), columns);
    assert_eq!(view.rows.len(), 10);
    assert!(view.rows.iter().all(|row| row.cells.len() == columns));
    assert!(view.cards.is_empty());
}

#[rstest]
fn test_mobile_renders_cards(mut grid: DataGrid<MapRecord>) {
    grid.set_width(375);
    let view = grid.render();

    assert_eq!(view.layout.mode, LayoutMode::Cards);
    assert!(view.headers.is_empty() && view.rows.is_empty());
    assert_eq!(view.cards.len(), 10);

    let first = &view.cards[0];
    assert_eq!(first.key, "1");
    assert_eq!(first.title, Some(Cell::text("Acme Corp")));
    let labels: Vec<&str> = first.fields.iter().map(|f| f.label.as_str()).collect();
    assert_eq!(labels, vec!["Email", "Balance", "Status", "Created"]);
    assert_eq!(first.actions.len(), 1);
    assert_eq!(first.actions[0].as_text(), "Edit | Delete");
}

#[rstest]
fn test_render_formats_cells(mut grid: DataGrid<MapRecord>) {
    let record = MapRecord::new("id")
        .with("id", 1)
        .with("name", "Acme Corp")
        .with("balance", 1250.75)
        .with("status", "escalated");
    grid.set_data(vec![record], None);

    let view = grid.render();
    let row = &view.rows[0];
    assert_eq!(row.cells[2], Cell::text("$1,250.75"));
    assert_eq!(
        row.cells[3],
        Cell::Badge {
            label: "escalated".into(),
            color: BadgeColor::Neutral
        }
    );
    // Missing fields render empty
    assert_eq!(row.cells[1], Cell::Empty);
    assert_eq!(view.pagination.summary(), "Showing 1-1 of 1");
}

#[rstest]
fn test_render_headers_reflect_sort_and_filters(mut grid: DataGrid<MapRecord>) {
    grid.toggle_sort("name");
    grid.set_filter("q", Some(FilterValue::text("acme")));

    let view = grid.render();
    let name = &view.headers[0];
    assert_eq!(name.sort_direction, Some(tabula_core::SortDirection::Ascending));
    assert!(name.filter_active);
    assert!(name.filterable);
    assert_eq!(name.width, Some(220));
    assert!(!view.headers[1].filter_active);
    assert!(!view.headers[5].sortable);
}

#[rstest]
fn test_debounced_text_input(mut grid: DataGrid<MapRecord>) {
    let t0 = Instant::now();
    grid.input_filter("q", Some(FilterValue::text("a")), t0);
    grid.input_filter("q", Some(FilterValue::text("ac")), t0 + Duration::from_millis(100));
    grid.input_filter("q", Some(FilterValue::text("acme")), t0 + Duration::from_millis(200));

    grid.tick(t0 + Duration::from_millis(400));
    assert!(grid.take_events().is_empty());
    assert_eq!(grid.next_deadline(), Some(t0 + Duration::from_millis(500)));

    grid.tick(t0 + Duration::from_millis(500));
    assert_eq!(
        grid.take_events(),
        vec![Event::FiltersChanged(vec![FilterEntry::new(
            "q",
            FilterOperator::Contains,
            FilterValue::text("acme"),
        )])]
    );
    // "Acme Corp", "Acme Corp 1", "Acme Corp 2"
    assert_eq!(visible_ids(&grid), vec!["1", "9", "17"]);
}

#[rstest]
fn test_non_text_input_commits_immediately(mut grid: DataGrid<MapRecord>) {
    grid.input_filter("vip", Some(FilterValue::Bool(true)), Instant::now());
    assert_eq!(grid.filter_entries().len(), 1);
    assert_eq!(grid.pagination().total_items(), 6);
}

#[test]
fn test_filter_with_explicit_operator() {
    init_test_logging();
    let mut filters = client_filters();
    filters.push(FilterConfig::number("limit", "Balance up to").on_field("balance"));
    let mut grid: DataGrid<MapRecord> =
        DataGrid::new(client_columns(), filters, client_grid_config()).expect("valid grid setup");
    grid.set_data(client_records(23), None);
    grid.take_events();

    grid.set_filter_with("limit", FilterOperator::LessOrEqual, Some(FilterValue::Number(5000.0)));
    let expected = vec![FilterEntry::new(
        "limit",
        FilterOperator::LessOrEqual,
        FilterValue::Number(5000.0),
    )];
    assert_eq!(grid.take_events(), vec![Event::FiltersChanged(expected)]);
    assert_eq!(visible_ids(&grid), ids(1..=4));

    // Non-finite input never becomes a filter
    grid.set_filter_with(
        "limit",
        FilterOperator::GreaterOrEqual,
        Some(FilterValue::Number(f64::INFINITY)),
    );
    assert!(grid.take_events().is_empty());
    assert_eq!(grid.filter_entries()[0].operator, FilterOperator::LessOrEqual);
}

#[rstest]
fn test_unmount_cancels_pending_input(mut grid: DataGrid<MapRecord>) {
    let t0 = Instant::now();
    grid.input_filter("q", Some(FilterValue::text("acme")), t0);
    grid.unmount();
    grid.tick(t0 + Duration::from_secs(5));
    assert!(grid.filter_entries().is_empty());
    assert!(grid.take_events().is_empty());
}

#[test]
fn test_staged_filters_apply_once() {
    init_test_logging();
    let mut config = client_grid_config();
    config.filters.mode = FilterMode::Staged;
    let mut grid: DataGrid<MapRecord> = DataGrid::new(client_columns(), client_filters(), config)
        .expect("valid grid setup");
    grid.set_data(client_records(23), None);

    let t0 = Instant::now();
    grid.set_filter("status", Some(FilterValue::text("active")));
    grid.input_filter("q", Some(FilterValue::text("acme")), t0);
    assert!(grid.take_events().is_empty());
    assert_eq!(grid.pagination().total_items(), 23);

    grid.apply_filters();
    let events = grid.take_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::FiltersChanged(entries) => assert_eq!(entries.len(), 2),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(visible_ids(&grid), vec!["1".to_string()]);
}

#[test]
fn test_server_mode_emits_intents_and_renders_given_page() {
    init_test_logging();
    let mut grid: DataGrid<MapRecord> =
        DataGrid::new(client_columns(), client_filters(), client_grid_config())
            .expect("valid grid setup")
            .with_paging(PagingMode::Server);
    grid.set_data(client_records(10), Some(95));
    assert_eq!(grid.pagination().total_pages(), 10);

    grid.toggle_sort("name");
    grid.set_page(4);
    let events = grid.take_events();
    assert!(events.iter().all(|event| event.requires_fetch()));
    assert_eq!(events.len(), 2);
    // The grid never reorders or slices server pages itself
    assert_eq!(visible_ids(&grid), ids(1..=10));

    grid.set_data(client_records(5), Some(35));
    assert_eq!(grid.pagination().page(), 4);
    assert_eq!(grid.pagination().display_range().start, 31);
    assert_eq!(grid.pagination().display_range().end, 35);

    // A stale total shrinks the page count and clamps the page
    grid.set_data(Vec::new(), Some(12));
    assert_eq!(grid.pagination().page(), 2);
    assert!(grid.render().is_empty);
}

#[test]
fn test_setup_errors_fail_fast() {
    let mut columns = client_columns();
    columns.push(ColumnDescriptor::text("name", "Duplicate"));
    assert!(DataGrid::<MapRecord>::new(columns, vec![], client_grid_config()).is_err());

    let mut config = client_grid_config();
    config.pagination.default_page_size = 7;
    assert!(DataGrid::<MapRecord>::new(client_columns(), vec![], config).is_err());
}

#[test]
fn test_json_records_sort_nulls_last() {
    let records = records_from_json(
        "id",
        r#"[
            {"id": 1, "name": "Beta", "balance": null, "status": "active"},
            {"id": 2, "name": "alpha", "balance": 10.5, "status": "closed"},
            {"id": 3, "name": "Gamma", "balance": 3, "status": "active"}
        ]"#,
    )
    .expect("valid fixture");
    let mut grid = DataGrid::new(client_columns(), client_filters(), client_grid_config())
        .expect("valid grid setup");
    grid.set_data(records, None);

    grid.toggle_sort("balance");
    assert_eq!(visible_ids(&grid), vec!["3", "2", "1"]);
    grid.toggle_sort("balance");
    assert_eq!(visible_ids(&grid), vec!["2", "3", "1"]);

    grid.toggle_sort("name");
    assert_eq!(visible_ids(&grid), vec!["2", "1", "3"]);
}

#[test]
fn test_json_records_need_an_identity() {
    let result = records_from_json("id", r#"[{"id": 1, "name": "Beta"}, {"name": "Anonymous"}]"#);
    assert!(result.is_err());
}
