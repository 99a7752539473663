//! Row selection
//!
//! Selection is tracked by record key and scoped to the records currently on
//! screen. The grid clears it whenever the bound data changes.

use std::hash::Hash;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Tri-state of the header checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllState {
    #[default]
    None,
    Some,
    All,
}

impl SelectAllState {
    pub fn is_all_selected(&self) -> bool {
        matches!(self, SelectAllState::All)
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, SelectAllState::Some)
    }
}

#[derive(Debug, Clone)]
pub struct SelectionSet<K> {
    selected: IndexSet<K>,
}

impl<K> Default for SelectionSet<K> {
    fn default() -> Self {
        Self {
            selected: IndexSet::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> SelectionSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove one key. Returns whether it is now selected.
    pub fn toggle_row(&mut self, key: K) -> bool {
        if self.selected.shift_remove(&key) {
            false
        } else {
            self.selected.insert(key);
            true
        }
    }

    /// Select every visible key, or nothing
    pub fn toggle_all<'a>(&mut self, checked: bool, visible: impl IntoIterator<Item = &'a K>)
    where
        K: 'a,
    {
        self.selected.clear();
        if checked {
            self.selected.extend(visible.into_iter().cloned());
        }
    }

    /// Returns true when something was selected
    pub fn clear(&mut self) -> bool {
        let had_selection = !self.selected.is_empty();
        self.selected.clear();
        had_selection
    }

    pub fn contains(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected keys in selection order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    /// Header checkbox state against the visible keys
    pub fn state<'a>(&self, visible: impl IntoIterator<Item = &'a K>) -> SelectAllState
    where
        K: 'a,
    {
        let mut visible_count = 0;
        let mut selected_count = 0;
        for key in visible {
            visible_count += 1;
            if self.selected.contains(key) {
                selected_count += 1;
            }
        }
        if visible_count > 0 && selected_count == visible_count {
            SelectAllState::All
        } else if selected_count > 0 {
            SelectAllState::Some
        } else {
            SelectAllState::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_all_then_deselect_one() {
        let visible: Vec<u32> = (1..=5).collect();
        let mut selection = SelectionSet::new();

        selection.toggle_all(true, &visible);
        assert_eq!(selection.len(), 5);
        assert!(selection.state(&visible).is_all_selected());

        assert!(!selection.toggle_row(3));
        let state = selection.state(&visible);
        assert!(state.is_indeterminate());
        assert!(!state.is_all_selected());

        selection.toggle_all(false, &visible);
        assert_eq!(selection.state(&visible), SelectAllState::None);
    }

    #[test]
    fn test_empty_page_is_never_all_selected() {
        let visible: Vec<u32> = vec![];
        let mut selection = SelectionSet::new();
        selection.toggle_all(true, &visible);
        assert_eq!(selection.state(&visible), SelectAllState::None);
    }

    #[test]
    fn test_toggle_row_and_clear() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle_row("a"));
        assert!(selection.toggle_row("b"));
        assert_eq!(selection.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(selection.clear());
        assert!(!selection.clear());
        assert!(!selection.contains(&"a"));
    }
}
