//! Data grid events
//!
//! Events emitted by the data grid to the hosting view. In server-paged mode
//! the sort, filter and page events are the host's cue to refetch and then
//! hand the new data back through `DataGrid::set_data`.

use tabula_core::{FilterEntry, SortSpec};

/// Events emitted by the data grid
#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent<R> {
    /// The active sort changed
    ///
    /// Carries a list so hosts written for multi-column sort APIs can pass it
    /// through. It always holds exactly one spec.
    SortChanged(Vec<SortSpec>),

    /// The applied filter set changed
    FiltersChanged(Vec<FilterEntry>),

    /// The user navigated to another page or picked another page size
    PageChanged { page: usize, page_size: usize },

    /// The selected records changed
    SelectionChanged(Vec<R>),

    /// A row or card was clicked
    RowClicked(R),
}

impl<R> GridEvent<R> {
    /// Whether a server-paged host needs to refetch for this event
    pub fn requires_fetch(&self) -> bool {
        matches!(
            self,
            GridEvent::SortChanged(_) | GridEvent::FiltersChanged(_) | GridEvent::PageChanged { .. }
        )
    }
}
