//! Attribute normalization and sample ordering
//!
//! Containers written by the logger store `"None"` for attributes that were
//! unknown at write time. Each attribute has exactly one function here that
//! maps the stored value to its effective default.

use crate::types::{RawScale, Sample};
use std::cmp::Ordering;

/// Sentinel written for unknown attributes
pub const NONE_SENTINEL: &str = "None";

/// Unit used for channels without a unit
pub const UNITLESS: &str = "1";

/// Scale used for channels without a scale factor
pub const DEFAULT_SCALE: f64 = 1.0;

/// Effective display unit: missing or `"None"` becomes `"1"`
pub fn normalize_unit(unit: Option<&str>) -> String {
    match unit {
        Some(unit) if unit != NONE_SENTINEL => unit.to_string(),
        _ => UNITLESS.to_string(),
    }
}

/// Effective scale factor
///
/// Missing attributes, the `"None"` sentinel and non-finite numbers all map to
/// `1.0`. Textual attributes holding a number are parsed.
pub fn normalize_scale(scale: Option<&RawScale>) -> f64 {
    let value = match scale {
        Some(RawScale::Number(value)) => Some(*value),
        Some(RawScale::Text(text)) if text.trim() != NONE_SENTINEL => text.trim().parse().ok(),
        _ => None,
    };

    match value {
        Some(value) if value.is_finite() => value,
        _ => DEFAULT_SCALE,
    }
}

/// Effective description: missing, empty or `"None"` means no description
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty() && *d != NONE_SENTINEL)
        .map(str::to_string)
}

/// Sort samples by timestamp, breaking ties by value
///
/// Compressed datasets do not keep insertion order, so every extraction goes
/// through here. The tie-break makes the result independent of input order.
pub fn sort_samples(samples: &mut [Sample]) {
    samples.sort_by(compare_samples);
}

fn compare_samples(a: &Sample, b: &Sample) -> Ordering {
    a.ts.total_cmp(&b.ts).then_with(|| a.value.total_cmp(&b.value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_normalization() {
        assert_eq!(normalize_unit(Some("None")), "1");
        assert_eq!(normalize_unit(None), "1");
        assert_eq!(normalize_unit(Some("V")), "V");
        // Only the exact sentinel is replaced
        assert_eq!(normalize_unit(Some("none")), "none");
    }

    #[test]
    fn test_scale_normalization() {
        assert_eq!(normalize_scale(None), 1.0);
        assert_eq!(normalize_scale(Some(&RawScale::Text("None".into()))), 1.0);
        assert_eq!(normalize_scale(Some(&RawScale::Text("0.25".into()))), 0.25);
        assert_eq!(normalize_scale(Some(&RawScale::Text("abc".into()))), 1.0);
        assert_eq!(normalize_scale(Some(&RawScale::Number(2.5))), 2.5);
        assert_eq!(normalize_scale(Some(&RawScale::Number(f64::NAN))), 1.0);
    }

    #[test]
    fn test_description_normalization() {
        assert_eq!(normalize_description(Some("None")), None);
        assert_eq!(normalize_description(Some("  ")), None);
        assert_eq!(normalize_description(None), None);
        assert_eq!(
            normalize_description(Some("Oil pressure")),
            Some("Oil pressure".to_string())
        );
    }

    #[test]
    fn test_sort_orders_by_timestamp() {
        let mut samples = vec![
            Sample::new(3.0, 30.0),
            Sample::new(1.0, 10.0),
            Sample::new(2.0, 20.0),
        ];
        sort_samples(&mut samples);
        let ts: Vec<f64> = samples.iter().map(|s| s.ts).collect();
        assert_eq!(ts, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut once = vec![
            Sample::new(5.0, 1.0),
            Sample::new(1.0, 4.0),
            Sample::new(5.0, -1.0),
            Sample::new(2.0, 0.0),
        ];
        sort_samples(&mut once);
        let mut twice = once.clone();
        sort_samples(&mut twice);
        assert_eq!(once, twice);
    }
}
