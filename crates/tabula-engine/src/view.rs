//! Render-ready grid output
//!
//! A [`GridView`] is everything a presentation layer needs to draw one frame
//! of the grid. It owns its data, so it can be handed to another thread or
//! serialized by the host without borrowing the grid.

use tabula_core::{Cell, ColumnDataType, SortDirection};

use crate::{DisplayRange, Layout, SelectAllState};

#[derive(Debug, Clone, PartialEq)]
pub struct GridView<K> {
    pub layout: Layout,
    /// Headers of the visible columns. Empty in card mode.
    pub headers: Vec<HeaderCell>,
    /// Table rows. Empty in card mode.
    pub rows: Vec<RowView<K>>,
    /// Cards. Empty in table modes.
    pub cards: Vec<CardView<K>>,
    pub select_all: SelectAllState,
    pub pagination: PaginationView,
    pub loading: bool,
    pub selectable: bool,
    /// No records on the current page
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub field: String,
    pub label: String,
    pub data_type: ColumnDataType,
    /// Show a sort affordance
    pub sortable: bool,
    /// Set on the column currently sorted
    pub sort_direction: Option<SortDirection>,
    /// Show a filter trigger
    pub filterable: bool,
    /// An applied filter targets this column
    pub filter_active: bool,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView<K> {
    pub key: K,
    pub selected: bool,
    /// One cell per visible column
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView<K> {
    pub key: K,
    pub selected: bool,
    pub title: Option<Cell>,
    pub fields: Vec<CardField>,
    /// Trailing action block
    pub actions: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardField {
    pub label: String,
    pub value: Cell,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub display_range: DisplayRange,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    pub page_size_options: Vec<usize>,
}

impl PaginationView {
    /// "Showing 21-23 of 23" style summary
    pub fn summary(&self) -> String {
        if self.total_items == 0 {
            return "No results".to_string();
        }
        format!(
            "Showing {}-{} of {}",
            self.display_range.start, self.display_range.end, self.total_items
        )
    }
}
