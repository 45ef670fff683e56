use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashSet;

use super::timestamp;
use crate::error::ServiceError;

/// Naive layouts accepted for candidates; these are read as UTC
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses one candidate literal into a UTC instant
///
/// Accepts RFC 3339 (any offset), naive date-times with `T` or a space
/// between date and time, and bare dates (midnight UTC).
pub fn parse_candidate(literal: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = literal
        .strip_suffix('Z')
        .or_else(|| literal.strip_suffix('z'))
        .unwrap_or(literal);

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Trims, drops empties, parses and dedups candidate literals
///
/// The first unparseable literal aborts with `InvalidCandidate`. Output keeps
/// first-occurrence order; an empty result is left for the caller to reject.
pub fn normalize_candidates<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, ServiceError> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for entry in raw {
        let trimmed = entry.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed = parse_candidate(trimmed)
            .ok_or_else(|| ServiceError::InvalidCandidate(trimmed.to_string()))?;
        let normalized = timestamp::format(&parsed);

        if seen.insert(normalized.clone()) {
            candidates.push(normalized);
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_candidates_collapse() {
        let candidates = normalize_candidates(&[
            "2025-01-01T10:00",
            "2025-01-01T10:00",
            "2025-01-02T09:00",
        ])
        .unwrap();
        assert_eq!(
            candidates,
            vec!["2025-01-01T10:00:00.000Z", "2025-01-02T09:00:00.000Z"]
        );
    }

    #[test]
    fn equivalent_instants_collapse_across_offsets() {
        let candidates =
            normalize_candidates(&["2025-01-01T19:00:00+09:00", "2025-01-01T10:00:00Z"]).unwrap();
        assert_eq!(candidates, vec!["2025-01-01T10:00:00.000Z"]);
    }

    #[test]
    fn first_occurrence_order_is_kept() {
        let candidates =
            normalize_candidates(&["2025-03-01 12:00", "2025-01-01", "2025-03-01T12:00:00"])
                .unwrap();
        assert_eq!(
            candidates,
            vec!["2025-03-01T12:00:00.000Z", "2025-01-01T00:00:00.000Z"]
        );
    }

    #[test]
    fn blank_entries_are_dropped() {
        let candidates = normalize_candidates(&["  ", "", " 2025-01-01T10:00 "]).unwrap();
        assert_eq!(candidates, vec!["2025-01-01T10:00:00.000Z"]);
        assert!(normalize_candidates(&["   "]).unwrap().is_empty());
    }

    #[test]
    fn unparseable_literal_is_named() {
        let err = normalize_candidates(&["2025-01-01T10:00", " not-a-date "]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid candidate date: not-a-date");
    }

    #[test]
    fn fractional_seconds_survive_to_millis() {
        let parsed = parse_candidate("2025-01-01T10:00:00.250").unwrap();
        assert_eq!(timestamp::format(&parsed), "2025-01-01T10:00:00.250Z");
    }
}
