//! Tabula Engine - The data grid and its building blocks
//!
//! Each piece is usable on its own:
//!
//! - `SortController` - Single-column sort toggle
//! - `FilterModel` - Live or staged filter entries
//! - `Pagination` - Page state and display range
//! - `SelectionSet` - Key-based selection with a tri-state header
//! - `choose_layout` - Table, reduced table or cards per viewport
//! - `CellFormatter` - Values to renderable cells
//! - `Debouncer` - Keyed, cancellable commit timers
//!
//! `DataGrid` composes all of them behind one intent/event API.

mod debounce;
mod events;
pub mod filtering;
mod filter_model;
mod format;
mod grid;
mod layout;
mod pagination;
mod selection;
pub mod sort;
mod view;

pub use debounce::Debouncer;
pub use events::GridEvent;
pub use filter_model::FilterModel;
pub use format::CellFormatter;
pub use grid::{DataGrid, PagingMode};
pub use layout::{CardLayout, Layout, LayoutMode, choose_layout};
pub use pagination::{DisplayRange, Pagination};
pub use selection::{SelectAllState, SelectionSet};
pub use sort::SortController;
pub use view::{CardField, CardView, GridView, HeaderCell, PaginationView, RowView};
