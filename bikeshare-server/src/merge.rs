//! Joining the information and status feeds into a snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::classify::{classify, color_for};
use crate::gbfs::{InfoPayload, StationInfo, StationStatus, StatusPayload};
use crate::snapshot::{Snapshot, StationFeature};

/// A station record that cannot be turned into a feature.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    /// Latitude or longitude absent from the information feed
    #[error("station {station_id} has no coordinates")]
    MissingCoordinates { station_id: String },

    /// Coordinates that are not finite numbers
    #[error("station {station_id} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates {
        station_id: String,
        lat: f64,
        lon: f64,
    },
}

impl MergeError {
    /// Short machine-readable label, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            MergeError::MissingCoordinates { .. } => "missing_coordinates",
            MergeError::InvalidCoordinates { .. } => "invalid_coordinates",
        }
    }
}

/// Merge the two feeds into a snapshot stamped with `built_at`.
///
/// Output order and membership follow the information feed: every info
/// station yields exactly one feature, and status entries with no matching
/// info station are ignored. A station missing from the status feed gets
/// zero counts and unset flags. If the status feed repeats a station id, the
/// last entry wins.
///
/// Any invalid station fails the whole merge.
pub fn merge(
    info: InfoPayload,
    status: StatusPayload,
    built_at: DateTime<Utc>,
) -> Result<Snapshot, MergeError> {
    let status_by_id: HashMap<&str, &StationStatus> = status
        .stations()
        .iter()
        .map(|s| (s.station_id.as_str(), s))
        .collect();

    let features = info
        .into_stations()
        .into_iter()
        .map(|station| {
            let unreported;
            let reported = match status_by_id.get(station.station_id.as_str()) {
                Some(&reported) => reported,
                None => {
                    unreported = StationStatus::unreported(&station.station_id);
                    &unreported
                }
            };
            build_feature(station, reported)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Snapshot::new(features, built_at))
}

fn build_feature(info: StationInfo, status: &StationStatus) -> Result<StationFeature, MergeError> {
    let (Some(lat), Some(lon)) = (info.lat, info.lon) else {
        return Err(MergeError::MissingCoordinates {
            station_id: info.station_id,
        });
    };
    if !lat.is_finite() || !lon.is_finite() {
        return Err(MergeError::InvalidCoordinates {
            station_id: info.station_id,
            lat,
            lon,
        });
    }

    let availability_status = classify(status.bikes_available, info.capacity);

    Ok(StationFeature {
        station_id: info.station_id,
        name: info.name,
        short_name: info.short_name,
        latitude: lat,
        longitude: lon,
        capacity: info.capacity,
        bikes_available: status.bikes_available,
        classic_bikes: status.bikes_available.saturating_sub(status.ebikes_available),
        ebikes_available: status.ebikes_available,
        docks_available: status.docks_available,
        is_installed: status.is_installed,
        is_renting: status.is_renting,
        is_returning: status.is_returning,
        is_charging: info.is_charging,
        availability_status,
        marker_color: color_for(availability_status),
        last_reported: status.last_reported,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::gbfs::Feed;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn arb_info() -> impl Strategy<Value = Vec<StationInfo>> {
        prop::collection::vec((0u8..30, 0u32..60, any::<bool>()), 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, capacity, is_charging)| StationInfo {
                    station_id: id.to_string(),
                    name: format!("Station {id}"),
                    short_name: String::new(),
                    lat: Some(45.5),
                    lon: Some(-73.5),
                    capacity,
                    is_charging,
                })
                .collect()
        })
    }

    fn arb_status() -> impl Strategy<Value = Vec<StationStatus>> {
        prop::collection::vec((0u8..40, 0u32..60, 0u32..60, 0u32..60), 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, bikes, ebikes, docks)| StationStatus {
                    bikes_available: bikes,
                    ebikes_available: ebikes,
                    docks_available: docks,
                    is_installed: Some(true),
                    ..StationStatus::unreported(id.to_string())
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn every_info_station_yields_one_feature(info in arb_info(), status in arb_status()) {
            let expected_ids: Vec<String> = info.iter().map(|s| s.station_id.clone()).collect();
            let built_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

            let snapshot = merge(Feed::new(info), Feed::new(status), built_at).unwrap();

            let ids: Vec<String> = snapshot.features().iter().map(|f| f.station_id.clone()).collect();
            prop_assert_eq!(ids, expected_ids);
            prop_assert_eq!(snapshot.stats().station_count, snapshot.features().len());
        }

        #[test]
        fn classic_bikes_and_totals_are_consistent(info in arb_info(), status in arb_status()) {
            let built_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let snapshot = merge(Feed::new(info), Feed::new(status), built_at).unwrap();

            for f in snapshot.features() {
                prop_assert_eq!(f.classic_bikes, f.bikes_available.saturating_sub(f.ebikes_available));
                prop_assert!(f.classic_bikes <= f.bikes_available);
            }

            let stats = snapshot.stats();
            let bikes: u64 = snapshot.features().iter().map(|f| u64::from(f.bikes_available)).sum();
            let ebikes: u64 = snapshot.features().iter().map(|f| u64::from(f.ebikes_available)).sum();
            let docks: u64 = snapshot.features().iter().map(|f| u64::from(f.docks_available)).sum();
            prop_assert_eq!(stats.total_bikes, bikes);
            prop_assert_eq!(stats.total_ebikes, ebikes);
            prop_assert_eq!(stats.total_docks, docks);
        }
    }
}
