//! Pagination state
//!
//! Pages are 1-indexed. Every request that could land out of range is clamped
//! instead of rejected, since stale page requests are routine when a fetch is
//! still in flight.

use serde::{Deserialize, Serialize};
use tabula_core::PaginationConfig;

/// 1-based inclusive bounds of the shown slice, both 0 when there is nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total_items: usize,
    /// Allowed page sizes, ascending
    page_size_options: Vec<usize>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::from_config(&PaginationConfig::default())
    }
}

impl Pagination {
    pub fn from_config(config: &PaginationConfig) -> Self {
        let mut options: Vec<usize> = config
            .page_size_options
            .iter()
            .copied()
            .filter(|size| *size > 0)
            .collect();
        options.sort_unstable();
        options.dedup();
        if options.is_empty() {
            options.push(config.default_page_size.max(1));
        }
        let mut pagination = Self {
            page: 1,
            page_size: options[0],
            total_items: 0,
            page_size_options: options,
        };
        pagination.page_size = pagination.snap(config.default_page_size);
        pagination
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    /// `max(1, ceil(total_items / page_size))`
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.page_size).max(1)
    }

    /// Zero-based index of the first item on the current page
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Index range of the current page within `total_items`
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset().min(self.total_items);
        let end = (start + self.page_size).min(self.total_items);
        start..end
    }

    pub fn display_range(&self) -> DisplayRange {
        if self.total_items == 0 {
            return DisplayRange::default();
        }
        DisplayRange {
            start: self.offset() + 1,
            end: (self.page * self.page_size).min(self.total_items),
        }
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    /// Go to page `page`, clamped into `[1, total_pages]`. Returns true when the page changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        let clamped = page.clamp(1, self.total_pages());
        if clamped != page {
            tracing::debug!(requested = page, page = clamped, "Clamped page request");
        }
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    pub fn next(&mut self) -> bool {
        self.set_page(self.page + 1)
    }

    pub fn prev(&mut self) -> bool {
        self.set_page(self.page.saturating_sub(1))
    }

    pub fn first(&mut self) -> bool {
        self.set_page(1)
    }

    pub fn last(&mut self) -> bool {
        self.set_page(self.total_pages())
    }

    /// Change the page size, snapped to the nearest allowed size.
    ///
    /// A new size resets to page 1. Returns true when the size changed.
    pub fn set_page_size(&mut self, requested: usize) -> bool {
        let size = self.snap(requested);
        if size != requested {
            tracing::debug!(requested, page_size = size, "Snapped page size to allowed option");
        }
        if size == self.page_size {
            return false;
        }
        self.page_size = size;
        self.page = 1;
        true
    }

    /// Update the item count and clamp the current page. Returns true when the page moved.
    pub fn set_total_items(&mut self, total_items: usize) -> bool {
        self.total_items = total_items;
        let clamped = self.page.min(self.total_pages());
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    /// Back to page 1. Returns true when the page changed.
    pub fn reset_page(&mut self) -> bool {
        let changed = self.page != 1;
        self.page = 1;
        changed
    }

    /// Nearest allowed page size, ties go to the smaller option
    fn snap(&self, requested: usize) -> usize {
        let mut best = self.page_size_options[0];
        for &option in &self.page_size_options {
            if option.abs_diff(requested) < best.abs_diff(requested) {
                best = option;
            }
        }
        best
    }
}
