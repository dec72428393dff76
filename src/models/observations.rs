use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Body of `POST /observations`.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsRequest {
    /// Named queries to resolve (keys defined in the query catalog).
    pub queries: Vec<String>,
    /// Lookback window in minutes, shared by all queries. Must be positive.
    pub window_minutes: u32,
    /// Optional end timestamp (unix seconds). Defaults to now.
    #[serde(default)]
    pub end_ts: Option<f64>,
    /// Optional step in seconds for the range query. Defaults to
    /// window / 100, floored, minimum 1.
    #[serde(default)]
    pub step_seconds: Option<u64>,
}

/// The reduction of one range-query result: a single average when the query
/// produced one series, or one average per label key when it produced many.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReducedValue {
    Scalar(f64),
    ByLabel(BTreeMap<String, f64>),
}

/// Resolved observations keyed by query name, in first-seen request order.
/// `None` marks a result that was not aggregable and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observations(Vec<(String, Option<ReducedValue>)>);

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, keeping the key's original position.
    pub fn insert(&mut self, name: String, value: Option<ReducedValue>) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Option<ReducedValue>> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Option<ReducedValue>)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for Observations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
