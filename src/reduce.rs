//! Reduction of raw range-query results into scalars.
//!
//! A matrix result collapses to:
//!   - a single average when it holds exactly one series,
//!   - a `label key -> average` map when it holds several,
//!   - `0.0` when it holds none.
//!
//! Anything that is not a matrix is not aggregable and reduces to `None`.

use std::collections::BTreeMap;

use crate::models::observations::ReducedValue;
use crate::models::prom::{RangeResult, RangeSeries, ResultKind};

/// Reserved label carrying the metric name; excluded from label keys.
const NAME_LABEL: &str = "__name__";

/// Reduce a range-query result by cardinality. Pure; never fails.
pub fn reduce(result: &RangeResult) -> Option<ReducedValue> {
    if result.kind != ResultKind::Matrix {
        return None;
    }

    match result.result.as_slice() {
        [] => Some(ReducedValue::Scalar(0.0)),
        [series] => Some(ReducedValue::Scalar(series_average(series))),
        many => {
            let mut by_label: BTreeMap<String, f64> = BTreeMap::new();
            for series in many {
                // Identical label sets collide; last series in received order wins.
                by_label.insert(label_key(&series.metric), series_average(series));
            }
            Some(ReducedValue::ByLabel(by_label))
        }
    }
}

/// Average of the series' valid numeric samples. Samples that fail numeric
/// coercion (or coerce to NaN) are dropped from both sum and count; a series
/// with no valid samples averages to 0.0.
pub fn series_average(series: &RangeSeries) -> f64 {
    let nums: Vec<f64> = series
        .values
        .iter()
        .filter_map(|(_, v)| sample_to_f64(v))
        .collect();
    if nums.is_empty() {
        return 0.0;
    }
    nums.iter().sum::<f64>() / nums.len() as f64
}

/// Coerce one sample to a finite-or-infinite f64. NaN and unparseable
/// values are rejected.
fn sample_to_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::String(s) => s.parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if parsed.is_nan() { None } else { Some(parsed) }
}

/// Canonical key for a series' label set: every label except `__name__`,
/// sorted by name, joined as `name=value` with commas. `_` when nothing
/// remains.
pub fn label_key(labels: &BTreeMap<String, String>) -> String {
    let parts: Vec<String> = labels
        .iter()
        .filter(|(name, _)| name.as_str() != NAME_LABEL)
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if parts.is_empty() {
        "_".to_string()
    } else {
        parts.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_approx(actual: f64, expected: f64, eps: f64) {
        assert!(
            (actual - expected).abs() < eps,
            "expected {expected}, got {actual}"
        );
    }

    fn series(labels: &[(&str, &str)], values: &[(f64, serde_json::Value)]) -> RangeSeries {
        RangeSeries {
            metric: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            values: values.to_vec(),
        }
    }

    fn matrix(result: Vec<RangeSeries>) -> RangeResult {
        RangeResult {
            kind: ResultKind::Matrix,
            result,
        }
    }

    #[test]
    fn test_empty_matrix_reduces_to_zero() {
        assert_eq!(reduce(&matrix(vec![])), Some(ReducedValue::Scalar(0.0)));
    }

    #[test]
    fn test_single_series_reduces_to_average() {
        let result = matrix(vec![series(
            &[("__name__", "up"), ("job", "node")],
            &[(0.0, json!("1.0")), (15.0, json!("3.0"))],
        )]);
        assert_eq!(reduce(&result), Some(ReducedValue::Scalar(2.0)));
    }

    #[test]
    fn test_non_numeric_samples_excluded() {
        let result = matrix(vec![series(
            &[],
            &[(0.0, json!("1.0")), (15.0, json!("abc")), (30.0, json!("3.0"))],
        )]);
        assert_eq!(reduce(&result), Some(ReducedValue::Scalar(2.0)));
    }

    #[test]
    fn test_nan_samples_excluded() {
        let result = matrix(vec![series(
            &[],
            &[(0.0, json!("NaN")), (15.0, json!("4.0"))],
        )]);
        assert_eq!(reduce(&result), Some(ReducedValue::Scalar(4.0)));
    }

    #[test]
    fn test_all_non_numeric_series_averages_to_zero() {
        let result = matrix(vec![series(
            &[],
            &[(0.0, json!("abc")), (15.0, json!("NaN")), (30.0, json!(null))],
        )]);
        assert_eq!(reduce(&result), Some(ReducedValue::Scalar(0.0)));
    }

    #[test]
    fn test_numeric_json_samples_accepted() {
        let result = matrix(vec![series(&[], &[(0.0, json!(2)), (15.0, json!(4.0))])]);
        assert_eq!(reduce(&result), Some(ReducedValue::Scalar(3.0)));
    }

    #[test]
    fn test_multi_series_reduces_per_label_key() {
        let result = matrix(vec![
            series(
                &[("__name__", "up"), ("instance", "a")],
                &[(0.0, json!("1.0")), (15.0, json!("3.0"))],
            ),
            series(
                &[("__name__", "up"), ("instance", "b")],
                &[(0.0, json!("10.0"))],
            ),
        ]);
        match reduce(&result) {
            Some(ReducedValue::ByLabel(map)) => {
                assert_eq!(map.len(), 2);
                assert_approx(map["instance=a"], 2.0, 1e-9);
                assert_approx(map["instance=b"], 10.0, 1e-9);
            }
            other => panic!("expected per-label map, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_series_all_non_numeric_entry_is_zero() {
        let result = matrix(vec![
            series(&[("instance", "a")], &[(0.0, json!("oops"))]),
            series(&[("instance", "b")], &[(0.0, json!("5.0"))]),
        ]);
        match reduce(&result) {
            Some(ReducedValue::ByLabel(map)) => {
                assert_approx(map["instance=a"], 0.0, 1e-9);
                assert_approx(map["instance=b"], 5.0, 1e-9);
            }
            other => panic!("expected per-label map, got {other:?}"),
        }
    }

    #[test]
    fn test_colliding_label_keys_last_series_wins() {
        let result = matrix(vec![
            series(
                &[("__name__", "requests_a"), ("job", "api")],
                &[(0.0, json!("1.0"))],
            ),
            series(
                &[("__name__", "requests_b"), ("job", "api")],
                &[(0.0, json!("7.0"))],
            ),
        ]);
        match reduce(&result) {
            Some(ReducedValue::ByLabel(map)) => {
                assert_eq!(map.len(), 1);
                assert_approx(map["job=api"], 7.0, 1e-9);
            }
            other => panic!("expected per-label map, got {other:?}"),
        }
    }

    #[test]
    fn test_non_matrix_kinds_reduce_to_none() {
        for kind in [
            ResultKind::Vector,
            ResultKind::Scalar,
            ResultKind::String,
            ResultKind::Unknown,
        ] {
            let result = RangeResult {
                kind,
                result: vec![series(&[], &[(0.0, json!("1.0"))])],
            };
            assert_eq!(reduce(&result), None, "kind {kind:?} should not aggregate");
        }
    }

    #[test]
    fn test_label_key_sorted_and_name_excluded() {
        let labels: BTreeMap<String, String> = [
            ("__name__", "x"),
            ("job", "a"),
            ("instance", "1"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(label_key(&labels), "instance=1,job=a");
    }

    #[test]
    fn test_label_key_placeholder_when_only_name() {
        let labels: BTreeMap<String, String> =
            [("__name__".to_string(), "x".to_string())].into_iter().collect();
        assert_eq!(label_key(&labels), "_");
        assert_eq!(label_key(&BTreeMap::new()), "_");
    }

    #[test]
    fn test_reduce_is_deterministic() {
        let result = matrix(vec![
            series(&[("instance", "a")], &[(0.0, json!("1.5"))]),
            series(&[("instance", "b")], &[(0.0, json!("2.5"))]),
        ]);
        assert_eq!(reduce(&result), reduce(&result));
    }
}
