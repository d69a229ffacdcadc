//! Data transfer objects for web responses.
//!
//! The stations response is a GeoJSON `FeatureCollection` with an extra
//! `metadata` member carrying the refresh time and system totals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::AvailabilityStatus;
use crate::snapshot::{Snapshot, StationFeature, SystemStats};

/// Response for the stations endpoint.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    /// Always `"FeatureCollection"`
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// One feature per station, in feed order
    pub features: Vec<FeatureResult>,

    pub metadata: Metadata,
}

/// Snapshot-level metadata.
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// When the snapshot was built; `null` before the first successful refresh
    pub last_updated: Option<DateTime<Utc>>,

    pub stats: SystemStats,
}

/// A single station as a GeoJSON feature.
#[derive(Debug, Serialize)]
pub struct FeatureResult {
    /// Always `"Feature"`
    #[serde(rename = "type")]
    pub kind: &'static str,

    pub geometry: PointGeometry,

    pub properties: StationProperties,
}

/// GeoJSON point geometry.
#[derive(Debug, Serialize)]
pub struct PointGeometry {
    /// Always `"Point"`
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

/// Feature properties.
///
/// Status flags are published as 0/1 integers; an unreported flag is 0.
#[derive(Debug, Serialize)]
pub struct StationProperties {
    pub station_id: String,
    pub name: String,
    pub short_name: String,
    pub capacity: u32,
    pub bikes_available: u32,
    pub classic_bikes: u32,
    pub ebikes_available: u32,
    pub docks_available: u32,
    pub is_installed: u8,
    pub is_renting: u8,
    pub is_returning: u8,
    pub is_charging: bool,
    pub availability_status: AvailabilityStatus,
    pub marker_color: &'static str,
    pub last_reported: Option<i64>,
}

/// Response for the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"`; staleness shows only in `last_updated`
    pub status: &'static str,

    pub last_updated: Option<DateTime<Utc>>,

    pub station_count: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StationsResponse {
    /// Create from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            kind: "FeatureCollection",
            features: snapshot
                .features()
                .iter()
                .map(FeatureResult::from_feature)
                .collect(),
            metadata: Metadata {
                last_updated: snapshot.last_updated(),
                stats: snapshot.stats(),
            },
        }
    }
}

impl FeatureResult {
    /// Create from a merged station feature.
    pub fn from_feature(f: &StationFeature) -> Self {
        Self {
            kind: "Feature",
            geometry: PointGeometry {
                kind: "Point",
                coordinates: [f.longitude, f.latitude],
            },
            properties: StationProperties {
                station_id: f.station_id.clone(),
                name: f.name.clone(),
                short_name: f.short_name.clone(),
                capacity: f.capacity,
                bikes_available: f.bikes_available,
                classic_bikes: f.classic_bikes,
                ebikes_available: f.ebikes_available,
                docks_available: f.docks_available,
                is_installed: flag(f.is_installed),
                is_renting: flag(f.is_renting),
                is_returning: flag(f.is_returning),
                is_charging: f.is_charging,
                availability_status: f.availability_status,
                marker_color: f.marker_color,
                last_reported: f.last_reported,
            },
        }
    }
}

impl HealthResponse {
    /// Create from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            status: "healthy",
            last_updated: snapshot.last_updated(),
            station_count: snapshot.stats().station_count,
        }
    }
}

fn flag(value: Option<bool>) -> u8 {
    u8::from(value.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbfs::Feed;
    use crate::merge::merge;
    use chrono::TimeZone;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        let info = serde_json::from_value(json!({ "data": { "stations": [
            { "station_id": "1", "name": "A", "short_name": "6001",
              "lat": 45.5, "lon": -73.5, "capacity": 20, "is_charging": true },
            { "station_id": "2", "name": "B", "lat": 45.6, "lon": -73.6, "capacity": 0 }
        ]}}))
        .unwrap();
        let status = serde_json::from_value(json!({ "data": { "stations": [
            { "station_id": "1", "num_bikes_available": 8, "num_ebikes_available": 3,
              "num_docks_available": 12, "is_installed": true, "is_renting": 1,
              "is_returning": 0, "last_reported": 1717243200 }
        ]}}))
        .unwrap();
        let built_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        merge(info, status, built_at).unwrap()
    }

    #[test]
    fn stations_response_shape() {
        let value = serde_json::to_value(StationsResponse::from_snapshot(&snapshot())).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["metadata"]["last_updated"], "2024-06-01T12:00:00Z");
        assert_eq!(
            value["metadata"]["stats"],
            json!({ "total_bikes": 8, "total_ebikes": 3, "total_docks": 12, "station_count": 2 })
        );

        let first = &value["features"][0];
        assert_eq!(first["type"], "Feature");
        assert_eq!(
            first["geometry"],
            json!({ "type": "Point", "coordinates": [-73.5, 45.5] })
        );
        assert_eq!(
            first["properties"],
            json!({
                "station_id": "1",
                "name": "A",
                "short_name": "6001",
                "capacity": 20,
                "bikes_available": 8,
                "classic_bikes": 5,
                "ebikes_available": 3,
                "docks_available": 12,
                "is_installed": 1,
                "is_renting": 1,
                "is_returning": 0,
                "is_charging": true,
                "availability_status": "medium",
                "marker_color": "#eab308",
                "last_reported": 1717243200
            })
        );

        let second = &value["features"][1]["properties"];
        assert_eq!(second["availability_status"], "unknown");
        assert_eq!(second["marker_color"], "#6b7280");
        assert_eq!(second["is_installed"], 0);
        assert_eq!(second["last_reported"], serde_json::Value::Null);
    }

    #[test]
    fn empty_snapshot_response() {
        let response = StationsResponse::from_snapshot(&Snapshot::empty());
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [],
                "metadata": {
                    "last_updated": null,
                    "stats": { "total_bikes": 0, "total_ebikes": 0, "total_docks": 0, "station_count": 0 }
                }
            })
        );
    }

    #[test]
    fn identical_feeds_serialize_identically() {
        let a = serde_json::to_string(&StationsResponse::from_snapshot(&snapshot())).unwrap();
        let b = serde_json::to_string(&StationsResponse::from_snapshot(&snapshot())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn health_reports_healthy_even_when_empty() {
        let health = HealthResponse::from_snapshot(&Snapshot::empty());
        assert_eq!(
            serde_json::to_value(&health).unwrap(),
            json!({ "status": "healthy", "last_updated": null, "station_count": 0 })
        );

        let health = HealthResponse::from_snapshot(&snapshot());
        assert_eq!(health.station_count, 2);
        assert!(health.last_updated.is_some());
    }

    #[test]
    fn merged_feed_without_status_publishes_zero_flags() {
        let info = Feed::new(vec![crate::gbfs::StationInfo {
            station_id: "9".into(),
            name: "Z".into(),
            short_name: String::new(),
            lat: Some(1.0),
            lon: Some(2.0),
            capacity: 5,
            is_charging: false,
        }]);
        let built_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let snapshot = merge(info, Feed::new(vec![]), built_at).unwrap();

        let props = FeatureResult::from_feature(&snapshot.features()[0]).properties;
        assert_eq!((props.is_installed, props.is_renting, props.is_returning), (0, 0, 0));
        assert_eq!(props.availability_status, AvailabilityStatus::Empty);
    }
}
