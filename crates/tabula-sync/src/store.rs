//! External key/value stores
//!
//! The bridge only needs to list, set and remove string pairs. `QueryParams`
//! is the stock implementation: an ordered map that reads from and writes to
//! URL query strings.

use indexmap::IndexMap;
use url::{Url, form_urlencoded};

/// A flat string key/value map the bridge mirrors filters into
pub trait ExternalStore {
    /// All pairs currently held, in store order
    fn pairs(&self) -> Vec<(String, String)>;

    fn set(&mut self, key: &str, value: &str);

    fn remove(&mut self, key: &str);
}

/// URL-style query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`
    ///
    /// Repeated keys keep the last value.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params = form_urlencoded::parse(query.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { params }
    }

    pub fn from_url(url: &Url) -> Self {
        let params = url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        Self { params }
    }

    /// Encode as a query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// Replace the query of `url`, dropping it entirely when empty
    pub fn apply_to_url(&self, url: &mut Url) {
        if self.params.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.to_query_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ExternalStore for QueryParams {
    fn pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.params.shift_remove(key);
    }
}
