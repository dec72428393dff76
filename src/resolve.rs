//! Resolution of named queries over a shared time window.
//!
//! The orchestrator looks each name up in the catalog, runs the backend
//! range query, and reduces the result. One unknown name or backend failure
//! aborts the whole batch; there is no partial-results mode.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::observations::Observations;
use crate::models::prom::RangeResult;
use crate::prom::BackendError;
use crate::reduce::reduce;

/// Absolute query window in unix seconds, shared by every name in a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryWindow {
    pub start: f64,
    pub end: f64,
    pub step: u64,
}

impl QueryWindow {
    /// Derive the window from the caller's relative view: `end` defaults to
    /// now, `step` to window / 100 (floored, minimum 1s).
    pub fn compute(window_minutes: u32, end_ts: Option<f64>, step_seconds: Option<u64>) -> Self {
        let end = end_ts.unwrap_or_else(now_unix_secs);
        let window_seconds = u64::from(window_minutes) * 60;
        let start = end - window_seconds as f64;
        let step = step_seconds
            .filter(|s| *s > 0)
            .unwrap_or_else(|| (window_seconds / 100).max(1));
        Self { start, end, step }
    }
}

fn now_unix_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs_f64()
}

/// Point-in-time lookup of a named query's backend expression.
pub trait CatalogLookup {
    fn lookup(&self, name: &str) -> Option<&str>;
}

/// Range-query capability. Transport, status handling, and timeouts live
/// behind this seam.
#[async_trait]
pub trait RangeQueryExecutor: Send + Sync {
    async fn query_range(
        &self,
        query: &str,
        start: f64,
        end: f64,
        step: u64,
    ) -> Result<RangeResult, BackendError>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown query: {0}")]
    UnknownQuery(String),
    #[error("query '{name}' failed: {source}")]
    Backend {
        name: String,
        #[source]
        source: BackendError,
    },
}

/// Resolve `names` in order against one shared window, reducing each result.
/// Duplicate names re-assign their slot rather than duplicating it.
pub async fn resolve<C, E>(
    catalog: &C,
    executor: &E,
    names: &[String],
    window_minutes: u32,
    end_ts: Option<f64>,
    step_seconds: Option<u64>,
) -> Result<Observations, ResolveError>
where
    C: CatalogLookup + ?Sized,
    E: RangeQueryExecutor + ?Sized,
{
    let window = QueryWindow::compute(window_minutes, end_ts, step_seconds);

    let mut observations = Observations::new();
    for name in names {
        let expr = catalog
            .lookup(name)
            .ok_or_else(|| ResolveError::UnknownQuery(name.clone()))?;
        let result = executor
            .query_range(expr, window.start, window.end, window.step)
            .await
            .map_err(|source| ResolveError::Backend {
                name: name.clone(),
                source,
            })?;
        observations.insert(name.clone(), reduce(&result));
    }
    Ok(observations)
}
