//! Station availability classification.
//!
//! Maps a station's bike count and capacity to a coarse status tag and the
//! marker colour the map uses to draw it.

use serde::Serialize;

/// Marker colour (gray) for stations that cannot be classified.
pub const FALLBACK_COLOR: &str = "#6b7280";

/// How well stocked a station is with bikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    /// Capacity is zero, so no ratio can be computed.
    Unknown,
    Empty,
    Low,
    Medium,
    High,
}

impl AvailabilityStatus {
    /// The wire tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Unknown => "unknown",
            AvailabilityStatus::Empty => "empty",
            AvailabilityStatus::Low => "low",
            AvailabilityStatus::Medium => "medium",
            AvailabilityStatus::High => "high",
        }
    }
}

/// Classify a station by the ratio of available bikes to capacity.
///
/// The capacity check comes first, so a zero-capacity station is `Unknown`
/// even when it also has zero bikes.
///
/// ```
/// use bikeshare_server::classify::{AvailabilityStatus, classify};
///
/// assert_eq!(classify(0, 0), AvailabilityStatus::Unknown);
/// assert_eq!(classify(0, 20), AvailabilityStatus::Empty);
/// assert_eq!(classify(1, 20), AvailabilityStatus::Low);
/// assert_eq!(classify(8, 20), AvailabilityStatus::Medium);
/// assert_eq!(classify(10, 20), AvailabilityStatus::High);
/// ```
pub fn classify(bikes_available: u32, capacity: u32) -> AvailabilityStatus {
    if capacity == 0 {
        return AvailabilityStatus::Unknown;
    }
    if bikes_available == 0 {
        return AvailabilityStatus::Empty;
    }

    let ratio = f64::from(bikes_available) / f64::from(capacity);
    if ratio < 0.1 {
        AvailabilityStatus::Low
    } else if ratio < 0.5 {
        AvailabilityStatus::Medium
    } else {
        AvailabilityStatus::High
    }
}

/// Hex marker colour for a status.
pub fn color_for(status: AvailabilityStatus) -> &'static str {
    match status {
        AvailabilityStatus::High => "#22c55e",
        AvailabilityStatus::Medium => "#eab308",
        AvailabilityStatus::Low => "#f97316",
        AvailabilityStatus::Empty => "#ef4444",
        AvailabilityStatus::Unknown => FALLBACK_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AvailabilityStatus; 5] = [
        AvailabilityStatus::Unknown,
        AvailabilityStatus::Empty,
        AvailabilityStatus::Low,
        AvailabilityStatus::Medium,
        AvailabilityStatus::High,
    ];

    #[test]
    fn zero_capacity_is_unknown() {
        assert_eq!(classify(0, 0), AvailabilityStatus::Unknown);
        assert_eq!(classify(5, 0), AvailabilityStatus::Unknown);
        assert_eq!(classify(u32::MAX, 0), AvailabilityStatus::Unknown);
    }

    #[test]
    fn ratio_boundaries() {
        // 1/10 is exactly 0.1, which is no longer low
        assert_eq!(classify(1, 11), AvailabilityStatus::Low);
        assert_eq!(classify(1, 10), AvailabilityStatus::Medium);
        assert_eq!(classify(4, 10), AvailabilityStatus::Medium);
        assert_eq!(classify(5, 10), AvailabilityStatus::High);
        assert_eq!(classify(10, 10), AvailabilityStatus::High);
    }

    #[test]
    fn more_bikes_than_capacity_is_high() {
        assert_eq!(classify(30, 20), AvailabilityStatus::High);
    }

    #[test]
    fn colors() {
        assert_eq!(color_for(AvailabilityStatus::High), "#22c55e");
        assert_eq!(color_for(AvailabilityStatus::Medium), "#eab308");
        assert_eq!(color_for(AvailabilityStatus::Low), "#f97316");
        assert_eq!(color_for(AvailabilityStatus::Empty), "#ef4444");
        assert_eq!(color_for(AvailabilityStatus::Unknown), "#6b7280");
    }

    #[test]
    fn unclassifiable_station_is_gray() {
        assert_eq!(color_for(classify(7, 0)), FALLBACK_COLOR);
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        for status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
