use serde::Deserialize;
use std::collections::BTreeMap;

// ── Prometheus JSON response types ──

/// Top-level envelope returned by `/api/v1/query_range`.
#[derive(Debug, Clone, Deserialize)]
pub struct PromEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<RangeResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The `data` object of a range query: result kind plus zero or more series.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeResult {
    #[serde(rename = "resultType")]
    pub kind: ResultKind,
    #[serde(default)]
    pub result: Vec<RangeSeries>,
}

impl Default for RangeResult {
    fn default() -> Self {
        Self {
            kind: ResultKind::Unknown,
            result: Vec::new(),
        }
    }
}

/// Prometheus result kinds. Only `Matrix` (range-vector) is aggregable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Matrix,
    Vector,
    Scalar,
    String,
    #[serde(other)]
    Unknown,
}

/// One labeled series with ordered (timestamp, sample) pairs. Samples stay
/// raw JSON values until numeric coercion; Prometheus encodes them as
/// strings on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeSeries {
    #[serde(default)]
    pub metric: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, serde_json::Value)>,
}
