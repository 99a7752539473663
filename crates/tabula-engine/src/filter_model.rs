//! Filter model
//!
//! Holds the active filter entries of one view, keyed by filter id. The model
//! keeps two maps:
//!
//! - the *draft*, which controls edit and always reflects the latest input
//! - the *applied* set, which is what the host filters by
//!
//! In live mode both maps move together. In staged mode edits only touch the
//! draft until [`FilterModel::apply`] copies it over.
//!
//! Empty values are never stored: setting one removes the entry instead.

use indexmap::IndexMap;
use tabula_core::{
    FilterConfig, FilterEntry, FilterMode, FilterOperator, FilterValue, Result, validate_filters,
};

#[derive(Debug, Clone)]
pub struct FilterModel {
    configs: IndexMap<String, FilterConfig>,
    mode: FilterMode,
    draft: IndexMap<String, FilterEntry>,
    applied: IndexMap<String, FilterEntry>,
}

impl FilterModel {
    /// Create an empty model over validated filter configs
    pub fn new(configs: Vec<FilterConfig>, mode: FilterMode) -> Result<Self> {
        validate_filters(&configs)?;
        let configs = configs
            .into_iter()
            .map(|config| (config.id.clone(), config))
            .collect();
        Ok(Self {
            configs,
            mode,
            draft: IndexMap::new(),
            applied: IndexMap::new(),
        })
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn config(&self, filter_id: &str) -> Option<&FilterConfig> {
        self.configs.get(filter_id)
    }

    pub fn configs(&self) -> impl Iterator<Item = &FilterConfig> {
        self.configs.values()
    }

    /// Set or remove a filter value.
    ///
    /// `None` and empty values remove the entry. Unknown ids and values that
    /// do not fit the filter kind are ignored. Returns true when the applied
    /// set changed and the host should be told.
    pub fn set(
        &mut self,
        filter_id: &str,
        operator: FilterOperator,
        value: Option<FilterValue>,
    ) -> bool {
        let Some(config) = self.configs.get(filter_id) else {
            tracing::debug!(filter_id, "Ignoring value for unknown filter");
            return false;
        };

        match value.map(normalize).filter(|v| !v.is_empty()) {
            Some(value) => {
                if !config.kind.accepts(&value) {
                    tracing::debug!(
                        filter_id,
                        value_kind = value.kind_name(),
                        "Ignoring value that does not fit the filter kind"
                    );
                    return false;
                }
                let entry = FilterEntry::new(filter_id, operator, value);
                self.draft.insert(filter_id.to_string(), entry);
            }
            None => {
                self.draft.shift_remove(filter_id);
            }
        }
        self.sync_live()
    }

    /// Set a value with the filter's default operator
    pub fn set_value(&mut self, filter_id: &str, value: Option<FilterValue>) -> bool {
        let operator = self
            .configs
            .get(filter_id)
            .map(|config| config.default_operator())
            .unwrap_or_default();
        self.set(filter_id, operator, value)
    }

    pub fn clear(&mut self, filter_id: &str) -> bool {
        self.draft.shift_remove(filter_id);
        self.sync_live()
    }

    pub fn clear_all(&mut self) -> bool {
        self.draft.clear();
        self.sync_live()
    }

    /// Copy the draft into the applied set.
    ///
    /// No-op in live mode. Returns true when the applied set changed.
    pub fn apply(&mut self) -> bool {
        if self.mode == FilterMode::Live || !self.is_dirty() {
            return false;
        }
        self.applied = self.draft.clone();
        tracing::debug!(count = self.applied.len(), "Applied staged filters");
        true
    }

    /// Drop uncommitted draft edits
    pub fn discard(&mut self) {
        self.draft = self.applied.clone();
    }

    /// Whether the draft differs from the applied set
    pub fn is_dirty(&self) -> bool {
        !same_entries(&self.draft, &self.applied)
    }

    /// Replace both draft and applied set, e.g. when restoring shared filters.
    ///
    /// Entries are checked the same way `set` checks them. Returns true when
    /// the applied set changed.
    pub fn replace(&mut self, entries: impl IntoIterator<Item = FilterEntry>) -> bool {
        let mut next = IndexMap::new();
        for entry in entries {
            let Some(config) = self.configs.get(&entry.filter_id) else {
                tracing::debug!(filter_id = %entry.filter_id, "Dropping entry for unknown filter");
                continue;
            };
            let value = normalize(entry.value);
            if value.is_empty() || !config.kind.accepts(&value) {
                continue;
            }
            next.insert(
                entry.filter_id.clone(),
                FilterEntry::new(entry.filter_id, entry.operator, value),
            );
        }
        let changed = !same_entries(&next, &self.applied);
        self.draft = next.clone();
        self.applied = next;
        changed
    }

    /// Applied entries, the set the host filters by
    pub fn entries(&self) -> Vec<FilterEntry> {
        self.applied.values().cloned().collect()
    }

    /// Draft entries, what the filter controls currently show
    pub fn draft_entries(&self) -> Vec<FilterEntry> {
        self.draft.values().cloned().collect()
    }

    /// Draft entry for one filter
    pub fn get(&self, filter_id: &str) -> Option<&FilterEntry> {
        self.draft.get(filter_id)
    }

    pub fn is_applied(&self, filter_id: &str) -> bool {
        self.applied.contains_key(filter_id)
    }

    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    fn sync_live(&mut self) -> bool {
        if self.mode == FilterMode::Staged {
            return false;
        }
        if same_entries(&self.draft, &self.applied) {
            return false;
        }
        self.applied = self.draft.clone();
        tracing::debug!(count = self.applied.len(), "Filters changed");
        true
    }
}

/// Strip list items that are empty strings
fn normalize(value: FilterValue) -> FilterValue {
    match value {
        FilterValue::List(items) => {
            FilterValue::List(items.into_iter().filter(|s| !s.is_empty()).collect())
        }
        other => other,
    }
}

/// Key order does not matter for equality of a filter model
fn same_entries(a: &IndexMap<String, FilterEntry>, b: &IndexMap<String, FilterEntry>) -> bool {
    a.len() == b.len() && a.iter().all(|(id, entry)| b.get(id) == Some(entry))
}
