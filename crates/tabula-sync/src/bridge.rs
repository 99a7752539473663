//! Filter synchronization bridge
//!
//! Views register their filter configurations under a view key. The bridge
//! keeps one shared filter map keyed by filter id, so two views that declare
//! the same filter see the same value, and mirrors that map into an
//! [`ExternalStore`] when sync is enabled. On load the shared map is seeded
//! from the store, restricted to filter ids some registered view recognizes.

use std::mem;

use indexmap::IndexMap;
use tabula_core::{
    FilterConfig, FilterEntry, FilterValue, Record, Result, SyncConfig, TabulaError,
};
use tabula_engine::DataGrid;

use crate::codec::{decode_entry, encode_entry, parse_key};
use crate::store::ExternalStore;

pub struct FilterSyncBridge<S: ExternalStore> {
    store: S,
    enabled: bool,
    registry: IndexMap<String, Vec<FilterConfig>>,
    globals: IndexMap<String, FilterEntry>,
}

impl<S: ExternalStore + std::fmt::Debug> std::fmt::Debug for FilterSyncBridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSyncBridge")
            .field("enabled", &self.enabled)
            .field("views", &self.registry.keys().collect::<Vec<_>>())
            .field("globals", &self.globals.len())
            .field("store", &self.store)
            .finish()
    }
}

impl<S: ExternalStore> FilterSyncBridge<S> {
    pub fn new(store: S, enabled: bool) -> Self {
        Self {
            store,
            enabled,
            registry: IndexMap::new(),
            globals: IndexMap::new(),
        }
    }

    pub fn from_config(store: S, config: &SyncConfig) -> Self {
        Self::new(store, config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // Registry

    /// Register a view's filter configurations.
    ///
    /// A filter id may appear in several views only with the same control
    /// shape, since they share one value.
    pub fn register(&mut self, view_key: impl Into<String>, configs: Vec<FilterConfig>) -> Result<()> {
        let view_key = view_key.into();
        if self.registry.contains_key(&view_key) {
            return Err(TabulaError::ViewAlreadyRegistered(view_key));
        }
        for config in &configs {
            if let Some(existing) = self.config(&config.id)
                && !same_shape(existing, config)
            {
                return Err(TabulaError::InvalidFilter {
                    id: config.id.clone(),
                    reason: format!(
                        "registered by another view with a different control kind ({view_key})"
                    ),
                });
            }
        }

        tracing::debug!(view_key = %view_key, filters = configs.len(), "Registered filter view");
        self.registry.insert(view_key, configs);
        Ok(())
    }

    /// Forget a view's configurations. Shared and external values stay.
    pub fn unregister(&mut self, view_key: &str) -> bool {
        let removed = self.registry.shift_remove(view_key).is_some();
        if removed {
            tracing::debug!(view_key, "Unregistered filter view");
        }
        removed
    }

    /// Forget a view and clear the values only it recognized
    pub fn unregister_and_clear(&mut self, view_key: &str) -> bool {
        let Some(configs) = self.registry.shift_remove(view_key) else {
            return false;
        };
        let mut cleared = 0;
        for config in &configs {
            if !self.recognizes(&config.id) && self.clear_global(&config.id) {
                cleared += 1;
            }
        }
        tracing::debug!(view_key, cleared, "Unregistered filter view and cleared its values");
        true
    }

    pub fn is_registered(&self, view_key: &str) -> bool {
        self.registry.contains_key(view_key)
    }

    /// Whether any registered view declares `filter_id`
    pub fn recognizes(&self, filter_id: &str) -> bool {
        self.config(filter_id).is_some()
    }

    fn config(&self, filter_id: &str) -> Option<&FilterConfig> {
        self.registry
            .values()
            .flatten()
            .find(|config| config.id == filter_id)
    }

    // Shared filter map

    /// Set a shared filter value with the filter's default operator.
    /// An empty value clears it.
    pub fn set_global(&mut self, filter_id: &str, value: FilterValue) -> bool {
        let Some(config) = self.config(filter_id) else {
            tracing::debug!(filter_id, "Ignoring value for an unrecognized filter");
            return false;
        };
        let entry = FilterEntry::new(filter_id, config.default_operator(), value);
        self.set_global_entry(entry)
    }

    /// Set a shared filter entry, mirroring it externally when sync is on.
    /// Returns true if the shared map changed.
    pub fn set_global_entry(&mut self, entry: FilterEntry) -> bool {
        if entry.value.is_empty() {
            return self.clear_global(&entry.filter_id);
        }
        let Some(config) = self.config(&entry.filter_id) else {
            tracing::debug!(filter_id = %entry.filter_id, "Ignoring value for an unrecognized filter");
            return false;
        };
        if !config.kind.accepts(&entry.value) {
            tracing::debug!(
                filter_id = %entry.filter_id,
                kind = entry.value.kind_name(),
                "Ignoring value of the wrong kind"
            );
            return false;
        }
        if self.globals.get(&entry.filter_id) == Some(&entry) {
            return false;
        }

        if self.enabled {
            let (key, value) = encode_entry(config, &entry);
            self.remove_external(&entry.filter_id);
            self.store.set(&key, &value);
        }
        tracing::debug!(filter_id = %entry.filter_id, operator = ?entry.operator, "Set shared filter");
        self.globals.insert(entry.filter_id.clone(), entry);
        true
    }

    /// Remove a shared filter and its external entry
    pub fn clear_global(&mut self, filter_id: &str) -> bool {
        if self.enabled {
            self.remove_external(filter_id);
        }
        self.globals.shift_remove(filter_id).is_some()
    }

    /// Remove every shared filter and the external entries of known filters.
    /// Returns how many shared entries were dropped.
    pub fn clear_all_global(&mut self) -> usize {
        let globals = mem::take(&mut self.globals);
        if self.enabled {
            for (key, _) in self.store.pairs() {
                let known = match parse_key(&key) {
                    Ok((id, _)) => globals.contains_key(id) || self.recognizes(id),
                    Err(_) => false,
                };
                if known {
                    self.store.remove(&key);
                }
            }
        }
        tracing::debug!(cleared = globals.len(), "Cleared shared filters");
        globals.len()
    }

    pub fn global(&self, filter_id: &str) -> Option<&FilterEntry> {
        self.globals.get(filter_id)
    }

    pub fn globals(&self) -> impl Iterator<Item = &FilterEntry> {
        self.globals.values()
    }

    // Views

    /// Seed the shared map from the external store.
    ///
    /// Only keys a registered view recognizes are read. Returns the number of
    /// entries taken over. Does nothing while sync is disabled.
    pub fn hydrate(&mut self) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut hydrated = 0;
        for (key, raw) in self.store.pairs() {
            let (filter_id, operator) = match parse_key(&key) {
                Ok(parsed) => parsed,
                Err(error) => {
                    tracing::trace!(key = %key, %error, "Skipping external key");
                    continue;
                }
            };
            let Some(config) = self.config(filter_id) else {
                tracing::trace!(key = %key, "Skipping unrecognized external key");
                continue;
            };
            match decode_entry(config, operator, &raw) {
                Ok(entry) => {
                    self.globals.insert(entry.filter_id.clone(), entry);
                    hydrated += 1;
                }
                Err(error) => {
                    tracing::warn!(key = %key, value = %raw, %error, "Ignoring malformed filter value");
                }
            }
        }
        tracing::debug!(hydrated, "Hydrated shared filters");
        hydrated
    }

    /// Mirror one view's filter entries into the shared map. Filters of the
    /// view without an entry are cleared.
    pub fn sync_view(&mut self, view_key: &str, entries: &[FilterEntry]) -> bool {
        let Some(configs) = self.registry.get(view_key) else {
            tracing::debug!(view_key, "Ignoring sync of an unregistered view");
            return false;
        };
        let ids: Vec<String> = configs.iter().map(|config| config.id.clone()).collect();

        let mut changed = false;
        for id in ids {
            changed |= match entries.iter().find(|entry| entry.filter_id == id) {
                Some(entry) => self.set_global_entry(entry.clone()),
                None => self.clear_global(&id),
            };
        }
        changed
    }

    /// Shared entries a view recognizes, in the view's filter order
    pub fn entries_for(&self, view_key: &str) -> Vec<FilterEntry> {
        let Some(configs) = self.registry.get(view_key) else {
            return Vec::new();
        };
        configs
            .iter()
            .filter_map(|config| self.globals.get(&config.id))
            .cloned()
            .collect()
    }

    // Grid helpers

    /// Register a grid under its view key and restore any shared filters
    pub fn mount_grid<R: Record + Clone>(&mut self, grid: &mut DataGrid<R>) -> Result<()> {
        let Some(view_key) = grid.view_key().map(str::to_string) else {
            return Err(TabulaError::Configuration(
                "a grid needs a view key to join filter sync".to_string(),
            ));
        };
        self.register(view_key.clone(), grid.filter_configs())?;
        self.hydrate();

        let entries = self.entries_for(&view_key);
        if !entries.is_empty() {
            grid.restore_filters(entries);
        }
        Ok(())
    }

    /// Mirror a grid's applied filters
    pub fn sync_grid<R: Record + Clone>(&mut self, grid: &DataGrid<R>) -> bool {
        match grid.view_key() {
            Some(view_key) => self.sync_view(view_key, &grid.filter_entries()),
            None => false,
        }
    }

    /// Cancel the grid's pending input and unregister its view
    pub fn unmount_grid<R: Record + Clone>(&mut self, grid: &mut DataGrid<R>) {
        grid.unmount();
        if let Some(view_key) = grid.view_key() {
            self.unregister(view_key);
        }
    }

    fn remove_external(&mut self, filter_id: &str) {
        for (key, _) in self.store.pairs() {
            if matches!(parse_key(&key), Ok((id, _)) if id == filter_id) {
                self.store.remove(&key);
            }
        }
    }
}

fn same_shape(a: &FilterConfig, b: &FilterConfig) -> bool {
    mem::discriminant(&a.kind) == mem::discriminant(&b.kind) && a.kind.is_range() == b.kind.is_range()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryParams;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tabula_core::{FilterOperator, SelectOption};

    fn status_filter() -> FilterConfig {
        FilterConfig::select(
            "status",
            "Status",
            vec![SelectOption::new("open", "Open"), SelectOption::new("paid", "Paid")],
        )
    }

    fn bridge(query: &str) -> FilterSyncBridge<QueryParams> {
        let mut bridge = FilterSyncBridge::new(QueryParams::parse(query), true);
        bridge
            .register("claims", vec![status_filter(), FilterConfig::date("filed", "Filed")])
            .unwrap();
        bridge
    }

    #[test]
    fn test_set_global_mirrors_externally() {
        let mut bridge = bridge("");
        assert!(bridge.set_global("status", FilterValue::text("open")));
        assert!(!bridge.set_global("status", FilterValue::text("open")));
        assert!(!bridge.set_global("unknown", FilterValue::text("x")));
        assert_eq!(bridge.store().to_query_string(), "status=open");

        assert!(bridge.set_global("status", FilterValue::text("")));
        assert!(bridge.global("status").is_none());
        assert!(bridge.store().is_empty());
    }

    #[test]
    fn test_operator_change_replaces_key() {
        let mut bridge = bridge("");
        let filed = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        bridge.set_global("filed", FilterValue::Date(filed));
        assert_eq!(bridge.store().get("filed"), Some("2024-05-01"));

        bridge.set_global_entry(FilterEntry::new(
            "filed",
            FilterOperator::LessOrEqual,
            FilterValue::Date(filed),
        ));
        assert_eq!(bridge.store().get("filed"), None);
        assert_eq!(bridge.store().get("filed[lte]"), Some("2024-05-01"));
    }

    #[test]
    fn test_hydrate_ignores_unknown_and_malformed() {
        let mut bridge = bridge("status=paid&filed=yesterday&utm_source=mail&page=3");
        assert_eq!(bridge.hydrate(), 1);
        assert_eq!(
            bridge.globals().cloned().collect::<Vec<_>>(),
            vec![FilterEntry::new("status", FilterOperator::Equals, FilterValue::text("paid"))]
        );
        // Unknown keys are left alone in the store
        assert_eq!(bridge.store().get("utm_source"), Some("mail"));
    }

    #[test]
    fn test_disabled_sync_keeps_store_untouched() {
        let mut bridge = FilterSyncBridge::new(QueryParams::parse("status=paid"), false);
        bridge.register("claims", vec![status_filter()]).unwrap();
        assert_eq!(bridge.hydrate(), 0);
        assert!(bridge.global("status").is_none());

        bridge.set_global("status", FilterValue::text("open"));
        assert_eq!(bridge.global("status").map(|e| &e.value), Some(&FilterValue::text("open")));
        assert_eq!(bridge.store().get("status"), Some("paid"));
    }

    #[test]
    fn test_registration_conflicts() {
        let mut bridge = bridge("");
        assert!(matches!(
            bridge.register("claims", vec![]),
            Err(TabulaError::ViewAlreadyRegistered(_))
        ));
        assert!(matches!(
            bridge.register("payments", vec![FilterConfig::text("status", "Status")]),
            Err(TabulaError::InvalidFilter { .. })
        ));
        assert!(bridge.register("payments", vec![status_filter()]).is_ok());
    }

    #[test]
    fn test_unregister_keeps_values_unless_cleared() {
        let mut bridge = bridge("");
        bridge.register("payments", vec![status_filter()]).unwrap();
        bridge.set_global("status", FilterValue::text("open"));
        let filed = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        bridge.set_global("filed", FilterValue::Date(filed));

        assert!(bridge.unregister("payments"));
        assert!(!bridge.unregister("payments"));
        assert_eq!(bridge.store().len(), 2);

        // No remaining view declares either filter
        assert!(bridge.unregister_and_clear("claims"));
        assert!(bridge.store().is_empty());
        assert_eq!(bridge.globals().count(), 0);
    }

    #[test]
    fn test_unregister_and_clear_spares_shared_ids() {
        let mut bridge = bridge("");
        bridge.register("payments", vec![status_filter()]).unwrap();
        bridge.set_global("status", FilterValue::text("open"));

        bridge.unregister_and_clear("claims");
        assert_eq!(bridge.store().get("status"), Some("open"));
    }

    #[test]
    fn test_sync_view_clears_absent_entries() {
        let mut bridge = bridge("status=open&filed=2024-05-01");
        bridge.hydrate();

        let entries = vec![FilterEntry::new(
            "status",
            FilterOperator::Equals,
            FilterValue::text("paid"),
        )];
        assert!(bridge.sync_view("claims", &entries));
        assert_eq!(bridge.store().to_query_string(), "status=paid");
        assert_eq!(bridge.entries_for("claims"), entries);
        assert!(!bridge.sync_view("unknown", &entries));
    }

    #[test]
    fn test_clear_all_global() {
        let mut bridge = bridge("status=open&filed=2024-05-01&tab=2");
        bridge.hydrate();
        assert_eq!(bridge.clear_all_global(), 2);
        assert_eq!(bridge.store().to_query_string(), "tab=2");
    }
}
