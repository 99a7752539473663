//! Data grid engine
//!
//! Composes sorting, filtering, pagination, selection, layout and cell
//! formatting over one bound record set. User intents come in as method
//! calls; outbound notifications queue up as [`GridEvent`]s that the host
//! drains with [`DataGrid::take_events`].
//!
//! In client-paged mode the grid holds the full record set and filters, sorts
//! and slices it itself. In server-paged mode it only emits intents and
//! renders whatever page the host hands back through [`DataGrid::set_data`].

use std::mem;
use std::time::Instant;

use indexmap::IndexSet;
use tabula_core::{
    ColumnDescriptor, FilterConfig, FilterEntry, FilterOperator, FilterValue, GridConfig, Record,
    Result, SortSpec, Viewport, validate_columns,
};

use crate::filtering::filtered_indices;
use crate::sort::sort_indices;
use crate::{
    CardField, CardView, CellFormatter, Debouncer, FilterModel, GridEvent, GridView, HeaderCell,
    Layout, LayoutMode, Pagination, PaginationView, RowView, SelectAllState, SelectionSet,
    SortController, choose_layout,
};

/// Who owns filtering, sorting and paging of the record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// The grid holds every record and pages locally
    #[default]
    Client,
    /// The host fetches one page at a time in response to grid events
    Server,
}

pub struct DataGrid<R: Record> {
    columns: Vec<ColumnDescriptor>,
    config: GridConfig,
    paging: PagingMode,
    view_key: Option<String>,
    selectable: bool,
    loading: bool,
    viewport: Viewport,

    data: Vec<R>,
    /// Indices into `data` shown on the current page
    visible: Vec<usize>,

    sort: SortController,
    filters: FilterModel,
    filter_input: Debouncer<String, Option<FilterValue>>,
    pagination: Pagination,
    selection: SelectionSet<R::Key>,
    formatter: CellFormatter,

    events: Vec<GridEvent<R>>,
}

impl<R: Record> std::fmt::Debug for DataGrid<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("view_key", &self.view_key)
            .field("paging", &self.paging)
            .field("columns", &self.columns.len())
            .field("records", &self.data.len())
            .field("sort", &self.sort.active())
            .field("filters", &self.filters.applied_count())
            .field("page", &self.pagination.page())
            .field("selected", &self.selection.len())
            .finish()
    }
}

impl<R: Record + Clone> DataGrid<R> {
    /// Create a grid. Column, filter and configuration mistakes fail here.
    pub fn new(
        columns: Vec<ColumnDescriptor>,
        filters: Vec<FilterConfig>,
        config: GridConfig,
    ) -> Result<Self> {
        validate_columns(&columns)?;
        config.validate()?;
        let filter_model = FilterModel::new(filters, config.filters.mode)?;

        Ok(Self {
            paging: PagingMode::Client,
            view_key: None,
            selectable: false,
            loading: false,
            viewport: Viewport::Desktop,
            data: Vec::new(),
            visible: Vec::new(),
            sort: SortController::new(),
            filters: filter_model,
            filter_input: Debouncer::new(config.filters.debounce()),
            pagination: Pagination::from_config(&config.pagination),
            selection: SelectionSet::new(),
            formatter: CellFormatter::new(config.formatting.clone()),
            events: Vec::new(),
            columns,
            config,
        })
    }

    pub fn with_paging(mut self, paging: PagingMode) -> Self {
        self.paging = paging;
        self
    }

    /// Name the view, used as its namespace by the filter sync bridge
    pub fn with_view_key(mut self, view_key: impl Into<String>) -> Self {
        self.view_key = Some(view_key.into());
        self
    }

    /// Start with a sort applied, without emitting an event
    pub fn with_sort(mut self, spec: SortSpec) -> Self {
        self.sort = SortController::with_initial(spec);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    // Inbound data

    /// Bind a new record set.
    ///
    /// `total_items` is the server-side count in server-paged mode and is
    /// ignored in client mode. Selection is always cleared.
    pub fn set_data(&mut self, data: Vec<R>, total_items: Option<usize>) {
        tracing::debug!(
            view_key = self.view_key.as_deref().unwrap_or_default(),
            records = data.len(),
            total_items = ?total_items,
            "Binding grid data"
        );
        let distinct = data.iter().map(|record| record.key()).collect::<IndexSet<_>>().len();
        if distinct < data.len() {
            tracing::warn!(
                records = data.len(),
                distinct,
                "Records share identity keys, selection treats them as one"
            );
        }
        self.data = data;
        if self.paging == PagingMode::Server {
            let total = total_items.unwrap_or(self.pagination.offset() + self.data.len());
            self.pagination.set_total_items(total);
        }
        self.refresh();
        self.clear_selection();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            tracing::debug!(?viewport, "Viewport changed");
        }
        self.viewport = viewport;
    }

    /// Classify a pixel width with the configured breakpoints
    pub fn set_width(&mut self, width: u32) {
        let viewport = self.config.layout.breakpoints.classify(width);
        self.set_viewport(viewport);
    }

    // Sorting

    /// Toggle the sort on `field`. Unknown and non-sortable fields are ignored.
    pub fn toggle_sort(&mut self, field: &str) {
        let sortable = self
            .columns
            .iter()
            .any(|column| column.field == field && column.sortable);
        if !sortable {
            tracing::debug!(field, "Ignoring sort request for non-sortable field");
            return;
        }
        let spec = self.sort.toggle(field);
        self.events.push(GridEvent::SortChanged(vec![spec]));
        if self.paging == PagingMode::Client {
            self.refresh();
            self.clear_selection();
        }
    }

    // Filtering

    /// Set a filter with its default operator
    pub fn set_filter(&mut self, filter_id: &str, value: Option<FilterValue>) {
        self.filter_input.cancel(&filter_id.to_string());
        if self.filters.set_value(filter_id, value) {
            self.filters_changed();
        }
    }

    pub fn set_filter_with(
        &mut self,
        filter_id: &str,
        operator: FilterOperator,
        value: Option<FilterValue>,
    ) {
        self.filter_input.cancel(&filter_id.to_string());
        if self.filters.set(filter_id, operator, value) {
            self.filters_changed();
        }
    }

    /// Feed raw control input. Debounced kinds wait for [`DataGrid::tick`];
    /// everything else commits immediately.
    pub fn input_filter(&mut self, filter_id: &str, value: Option<FilterValue>, now: Instant) {
        let Some(config) = self.filters.config(filter_id) else {
            tracing::debug!(filter_id, "Ignoring input for unknown filter");
            return;
        };
        if config.kind.is_debounced() {
            tracing::trace!(filter_id, "Scheduling debounced filter commit");
            self.filter_input.schedule(filter_id.to_string(), value, now);
        } else {
            self.set_filter(filter_id, value);
        }
    }

    /// Commit debounced input whose timer has expired
    pub fn tick(&mut self, now: Instant) {
        let due = self.filter_input.poll(now);
        self.commit_inputs(due);
    }

    /// Earliest pending debounce deadline, for hosts that arm a timer
    pub fn next_deadline(&self) -> Option<Instant> {
        self.filter_input.next_deadline()
    }

    pub fn clear_filter(&mut self, filter_id: &str) {
        self.filter_input.cancel(&filter_id.to_string());
        if self.filters.clear(filter_id) {
            self.filters_changed();
        }
    }

    pub fn clear_filters(&mut self) {
        self.filter_input.cancel_all();
        if self.filters.clear_all() {
            self.filters_changed();
        }
    }

    /// Commit the staged draft, including input still waiting on its debounce
    pub fn apply_filters(&mut self) {
        let pending = self.filter_input.flush();
        self.commit_inputs(pending);
        if self.filters.apply() {
            self.filters_changed();
        }
    }

    /// Drop staged edits that were not applied
    pub fn discard_filters(&mut self) {
        self.filter_input.cancel_all();
        self.filters.discard();
    }

    /// Replace the whole filter set, e.g. with filters restored from a shared link
    pub fn restore_filters(&mut self, entries: Vec<FilterEntry>) {
        self.filter_input.cancel_all();
        if self.filters.replace(entries) {
            self.filters_changed();
        }
    }

    // Pagination

    /// Go to a page, clamped into range
    pub fn set_page(&mut self, page: usize) {
        if self.pagination.set_page(page) {
            self.page_changed();
        }
    }

    pub fn next_page(&mut self) {
        if self.pagination.next() {
            self.page_changed();
        }
    }

    pub fn prev_page(&mut self) {
        if self.pagination.prev() {
            self.page_changed();
        }
    }

    /// Pick a page size, snapped to the configured options
    pub fn set_page_size(&mut self, page_size: usize) {
        if self.pagination.set_page_size(page_size) {
            self.page_changed();
        }
    }

    // Rows

    /// Toggle selection of a visible record
    pub fn toggle_row(&mut self, key: &R::Key) {
        if !self.selectable {
            return;
        }
        if !self.visible_records().any(|record| &record.key() == key) {
            tracing::debug!(?key, "Ignoring selection of a record that is not visible");
            return;
        }
        self.selection.toggle_row(key.clone());
        self.selection_changed();
    }

    /// Select every visible record, or none
    pub fn toggle_all(&mut self, checked: bool) {
        if !self.selectable {
            return;
        }
        let keys = self.visible_keys();
        self.selection.toggle_all(checked, &keys);
        self.selection_changed();
    }

    pub fn click_row(&mut self, key: &R::Key) {
        let clicked = self.visible_records().find(|record| &record.key() == key).cloned();
        match clicked {
            Some(record) => self.events.push(GridEvent::RowClicked(record)),
            None => tracing::debug!(?key, "Ignoring click on a record that is not visible"),
        }
    }

    // Outbound

    /// Drain the queued events, oldest first
    pub fn take_events(&mut self) -> Vec<GridEvent<R>> {
        mem::take(&mut self.events)
    }

    /// Cancel pending debounce timers. Call when the hosting view goes away.
    pub fn unmount(&mut self) {
        let cancelled = self.filter_input.cancel_all();
        tracing::debug!(
            view_key = self.view_key.as_deref().unwrap_or_default(),
            cancelled,
            "Grid unmounted"
        );
    }

    pub fn render(&self) -> GridView<R::Key> {
        let layout = self.layout();
        let keys = self.visible_keys();
        let select_all = if self.selectable {
            self.selection.state(&keys)
        } else {
            SelectAllState::None
        };

        let (headers, rows, cards) = if layout.mode == LayoutMode::Cards {
            (Vec::new(), Vec::new(), self.render_cards(&layout))
        } else {
            (self.render_headers(&layout), self.render_rows(&layout), Vec::new())
        };

        GridView {
            headers,
            rows,
            cards,
            select_all,
            pagination: self.pagination_view(),
            loading: self.loading,
            selectable: self.selectable,
            is_empty: self.visible.is_empty(),
            layout,
        }
    }

    pub fn layout(&self) -> Layout {
        choose_layout(self.viewport, &self.columns)
    }

    // Accessors

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn paging(&self) -> PagingMode {
        self.paging
    }

    pub fn view_key(&self) -> Option<&str> {
        self.view_key.as_deref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.active()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn filters(&self) -> &FilterModel {
        &self.filters
    }

    /// Applied filter entries
    pub fn filter_entries(&self) -> Vec<FilterEntry> {
        self.filters.entries()
    }

    pub fn filter_configs(&self) -> Vec<FilterConfig> {
        self.filters.configs().cloned().collect()
    }

    pub fn visible_records(&self) -> impl Iterator<Item = &R> {
        self.visible.iter().filter_map(|&idx| self.data.get(idx))
    }

    /// Selected records in display order
    pub fn selected_records(&self) -> Vec<R> {
        self.visible_records()
            .filter(|record| self.selection.contains(&record.key()))
            .cloned()
            .collect()
    }

    pub fn select_all_state(&self) -> SelectAllState {
        self.selection.state(&self.visible_keys())
    }

    // Internals

    fn visible_keys(&self) -> Vec<R::Key> {
        self.visible_records().map(|record| record.key()).collect()
    }

    /// Recompute the visible page from the bound data
    fn refresh(&mut self) {
        match self.paging {
            PagingMode::Client => {
                let mut matched = filtered_indices(&self.data, &self.filters);
                if let Some(spec) = self.sort.active() {
                    sort_indices(
                        &self.data,
                        &mut matched,
                        spec,
                        self.config.sorting.null_position,
                    );
                }
                self.pagination.set_total_items(matched.len());
                let range = self.pagination.range();
                tracing::trace!(
                    matched = matched.len(),
                    start = range.start,
                    end = range.end,
                    "Recomputed client page"
                );
                self.visible = matched.get(range).map(<[usize]>::to_vec).unwrap_or_default();
            }
            PagingMode::Server => {
                self.visible = (0..self.data.len()).collect();
            }
        }
    }

    fn commit_inputs(&mut self, inputs: Vec<(String, Option<FilterValue>)>) {
        let mut changed = false;
        for (filter_id, value) in inputs {
            tracing::trace!(filter_id = %filter_id, "Committing filter input");
            changed |= self.filters.set_value(&filter_id, value);
        }
        if changed {
            self.filters_changed();
        }
    }

    /// A filter change always returns to page 1 without a page event
    fn filters_changed(&mut self) {
        self.pagination.reset_page();
        self.events
            .push(GridEvent::FiltersChanged(self.filters.entries()));
        if self.paging == PagingMode::Client {
            self.refresh();
            self.clear_selection();
        }
    }

    fn page_changed(&mut self) {
        self.events.push(GridEvent::PageChanged {
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
        });
        if self.paging == PagingMode::Client {
            self.refresh();
            self.clear_selection();
        }
    }

    fn selection_changed(&mut self) {
        let selected = self.selected_records();
        self.events.push(GridEvent::SelectionChanged(selected));
    }

    fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.events.push(GridEvent::SelectionChanged(Vec::new()));
        }
    }

    fn render_headers(&self, layout: &Layout) -> Vec<HeaderCell> {
        layout
            .visible_columns
            .iter()
            .filter_map(|&idx| self.columns.get(idx))
            .map(|column| HeaderCell {
                field: column.field.clone(),
                label: column.label.clone(),
                data_type: column.data_type,
                sortable: column.sortable && layout.sort_affordances,
                sort_direction: self.sort.direction_for(&column.field),
                filterable: column.filterable && layout.filter_triggers,
                filter_active: self.filter_targets(&column.field),
                width: column.width,
            })
            .collect()
    }

    fn render_rows(&self, layout: &Layout) -> Vec<RowView<R::Key>> {
        self.visible_records()
            .map(|record| {
                let key = record.key();
                RowView {
                    selected: self.selectable && self.selection.contains(&key),
                    cells: layout
                        .visible_columns
                        .iter()
                        .filter_map(|&idx| self.columns.get(idx))
                        .map(|column| self.formatter.format_field(column, record))
                        .collect(),
                    key,
                }
            })
            .collect()
    }

    fn render_cards(&self, layout: &Layout) -> Vec<CardView<R::Key>> {
        let Some(card) = &layout.card else {
            return Vec::new();
        };
        self.visible_records()
            .map(|record| {
                let key = record.key();
                let cell = |idx: usize| {
                    self.columns
                        .get(idx)
                        .map(|column| self.formatter.format_field(column, record))
                };
                CardView {
                    selected: self.selectable && self.selection.contains(&key),
                    title: card.title.and_then(cell),
                    fields: card
                        .fields
                        .iter()
                        .filter_map(|&idx| {
                            let column = self.columns.get(idx)?;
                            Some(CardField {
                                label: column.label.clone(),
                                value: self.formatter.format_field(column, record),
                            })
                        })
                        .collect(),
                    actions: card.actions.iter().filter_map(|&idx| cell(idx)).collect(),
                    key,
                }
            })
            .collect()
    }

    fn pagination_view(&self) -> PaginationView {
        let p = &self.pagination;
        PaginationView {
            page: p.page(),
            page_size: p.page_size(),
            total_pages: p.total_pages(),
            total_items: p.total_items(),
            display_range: p.display_range(),
            can_go_next: p.can_go_next(),
            can_go_prev: p.can_go_prev(),
            page_size_options: p.page_size_options().to_vec(),
        }
    }

    /// Whether an applied filter targets `field`
    fn filter_targets(&self, field: &str) -> bool {
        self.filters
            .configs()
            .any(|config| config.field == field && self.filters.is_applied(&config.id))
    }
}
