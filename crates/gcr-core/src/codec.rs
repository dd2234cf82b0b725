//! Text codec for nested attributes.
//!
//! Rows are flat, so every nested attribute (label maps, resource lists,
//! taints, tolerations, spread constraints, spec documents) is persisted as
//! compact JSON text in a single column. Two rules hold for every pair:
//!
//! - an empty value encodes to `""`, never to `null` or `{}`
//! - empty or whitespace-only text decodes to the zero value
//!
//! Non-empty values round-trip exactly.

use crate::errors::CodecError;
use crate::model::ResourceList;
use chrono::{DateTime, TimeZone, Utc};
use k8s_openapi::api::core::v1::{PodSpec, Taint, Toleration, TopologySpreadConstraint};
use k8s_openapi::api::policy::v1::PodDisruptionBudgetSpec;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

type CodecResult<T> = std::result::Result<T, CodecError>;

fn encode<T: Serialize + ?Sized>(field: &'static str, value: &T) -> CodecResult<String> {
    serde_json::to_string(value).map_err(|e| CodecError::Encode {
        field,
        reason: e.to_string(),
    })
}

fn decode<T: DeserializeOwned + Default>(field: &'static str, text: &str) -> CodecResult<T> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(text).map_err(|e| CodecError::Decode {
        field,
        text: text.to_string(),
        reason: e.to_string(),
    })
}

pub fn labels_to_text(labels: &BTreeMap<String, String>) -> CodecResult<String> {
    if labels.is_empty() {
        return Ok(String::new());
    }
    encode("Labels", labels)
}

pub fn labels_from_text(text: &str) -> CodecResult<BTreeMap<String, String>> {
    decode("Labels", text)
}

/// Encode a resource list (requests, allocatable, capacity).
///
/// `field` names the column so that failures point at the right place.
pub fn resources_to_text(field: &'static str, resources: &ResourceList) -> CodecResult<String> {
    if resources.is_empty() {
        return Ok(String::new());
    }
    encode(field, resources)
}

pub fn resources_from_text(field: &'static str, text: &str) -> CodecResult<ResourceList> {
    decode(field, text)
}

pub fn taints_to_text(taints: &[Taint]) -> CodecResult<String> {
    if taints.is_empty() {
        return Ok(String::new());
    }
    encode("Taints", taints)
}

pub fn taints_from_text(text: &str) -> CodecResult<Vec<Taint>> {
    decode("Taints", text)
}

pub fn tolerations_to_text(tolerations: &[Toleration]) -> CodecResult<String> {
    if tolerations.is_empty() {
        return Ok(String::new());
    }
    encode("Tolerations", tolerations)
}

pub fn tolerations_from_text(text: &str) -> CodecResult<Vec<Toleration>> {
    decode("Tolerations", text)
}

pub fn topology_spread_constraints_to_text(
    constraints: &[TopologySpreadConstraint],
) -> CodecResult<String> {
    if constraints.is_empty() {
        return Ok(String::new());
    }
    encode("TopologySpreadConstraints", constraints)
}

pub fn topology_spread_constraints_from_text(
    text: &str,
) -> CodecResult<Vec<TopologySpreadConstraint>> {
    decode("TopologySpreadConstraints", text)
}

/// Encode a full pod spec document. The default spec counts as empty.
pub fn pod_spec_to_text(spec: &PodSpec) -> CodecResult<String> {
    if *spec == PodSpec::default() {
        return Ok(String::new());
    }
    encode("Spec", spec)
}

pub fn pod_spec_from_text(text: &str) -> CodecResult<PodSpec> {
    decode("Spec", text)
}

pub fn pdb_spec_to_text(spec: &PodDisruptionBudgetSpec) -> CodecResult<String> {
    if *spec == PodDisruptionBudgetSpec::default() {
        return Ok(String::new());
    }
    encode("Spec", spec)
}

pub fn pdb_spec_from_text(text: &str) -> CodecResult<PodDisruptionBudgetSpec> {
    decode("Spec", text)
}

/// Encode an int-or-percent sizing value. The JSON form keeps the variant,
/// so `String("1")` is stored as `"1"` and `Int(1)` as `1`.
pub fn int_or_string_to_text(
    field: &'static str,
    value: Option<&IntOrString>,
) -> CodecResult<String> {
    match value {
        None => Ok(String::new()),
        Some(v) => encode(field, v),
    }
}

pub fn int_or_string_from_text(
    field: &'static str,
    text: &str,
) -> CodecResult<Option<IntOrString>> {
    decode(field, text)
}

pub fn zones_to_text(zones: &[String]) -> CodecResult<String> {
    if zones.is_empty() {
        return Ok(String::new());
    }
    encode("Zones", zones)
}

pub fn zones_from_text(text: &str) -> CodecResult<Vec<String>> {
    decode("Zones", text)
}

/// Timestamps are stored as milliseconds since the Unix epoch, UTC.
pub fn timestamp_to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn millis_to_timestamp(field: &'static str, millis: i64) -> CodecResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| CodecError::Decode {
            field,
            text: millis.to_string(),
            reason: "timestamp out of range".to_string(),
        })
}

pub fn optional_millis_to_timestamp(
    field: &'static str,
    millis: Option<i64>,
) -> CodecResult<Option<DateTime<Utc>>> {
    millis.map(|ms| millis_to_timestamp(field, ms)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_encode_to_empty_string() {
        assert_eq!(labels_to_text(&BTreeMap::new()).unwrap(), "");
        assert_eq!(resources_to_text("Requests", &ResourceList::new()).unwrap(), "");
        assert_eq!(taints_to_text(&[]).unwrap(), "");
        assert_eq!(tolerations_to_text(&[]).unwrap(), "");
        assert_eq!(topology_spread_constraints_to_text(&[]).unwrap(), "");
        assert_eq!(pod_spec_to_text(&PodSpec::default()).unwrap(), "");
        assert_eq!(int_or_string_to_text("MaxSurge", None).unwrap(), "");
        assert_eq!(zones_to_text(&[]).unwrap(), "");
    }

    #[test]
    fn test_whitespace_decodes_to_zero_value() {
        assert!(labels_from_text("  \n").unwrap().is_empty());
        assert!(taints_from_text("").unwrap().is_empty());
        assert_eq!(pod_spec_from_text(" ").unwrap(), PodSpec::default());
        assert_eq!(int_or_string_from_text("MaxSurge", "   ").unwrap(), None);
        assert!(zones_from_text("").unwrap().is_empty());
    }

    #[test]
    fn test_int_or_string_keeps_variant() {
        let numeric_string = IntOrString::String("1".to_string());
        let text = int_or_string_to_text("MaxSurge", Some(&numeric_string)).unwrap();
        assert_eq!(text, "\"1\"");
        assert_eq!(
            int_or_string_from_text("MaxSurge", &text).unwrap(),
            Some(numeric_string)
        );

        let empty = IntOrString::String(String::new());
        let text = int_or_string_to_text("MaxUnavailable", Some(&empty)).unwrap();
        assert_eq!(
            int_or_string_from_text("MaxUnavailable", &text).unwrap(),
            Some(empty)
        );

        assert_eq!(
            int_or_string_to_text("MaxSurge", Some(&IntOrString::Int(-1))).unwrap(),
            "-1"
        );
    }

    #[test]
    fn test_int_or_string_rejects_malformed_text() {
        let err = int_or_string_from_text("MinAvailable", "25%").unwrap_err();
        assert_eq!(err.field(), "MinAvailable");
    }

    #[test]
    fn test_millis_round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let ms = timestamp_to_millis(&ts);
        assert_eq!(millis_to_timestamp("CreationTimestamp", ms).unwrap(), ts);
    }

    #[test]
    fn test_out_of_range_millis_is_decode_error() {
        let err = millis_to_timestamp("SnapshotTimestamp", i64::MAX).unwrap_err();
        assert_eq!(err.field(), "SnapshotTimestamp");
    }
}
