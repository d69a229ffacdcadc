//! GBFS feed DTOs.
//!
//! These types map directly to the `station_information` and
//! `station_status` JSON documents. Optional fields use `#[serde(default)]`
//! because operators routinely omit them.

use serde::{Deserialize, Deserializer};

/// Top-level GBFS document: `{"data": {"stations": [...]}}`.
///
/// The `data.stations` list is required; a document without it fails to
/// deserialize.
#[derive(Debug, Clone, Deserialize)]
pub struct Feed<T> {
    pub data: FeedData<T>,
}

/// The `data` object of a GBFS document.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedData<T> {
    pub stations: Vec<T>,
}

impl<T> Feed<T> {
    /// Wrap a station list in a feed document.
    pub fn new(stations: Vec<T>) -> Self {
        Self {
            data: FeedData { stations },
        }
    }

    /// The stations, in feed order.
    pub fn stations(&self) -> &[T] {
        &self.data.stations
    }

    pub fn into_stations(self) -> Vec<T> {
        self.data.stations
    }
}

/// The `station_information` feed.
pub type InfoPayload = Feed<StationInfo>;

/// The `station_status` feed.
pub type StatusPayload = Feed<StationStatus>;

/// Static station metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationInfo {
    /// Unique station identifier; the join key with `station_status`.
    pub station_id: String,

    /// Public station name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Operator's short code for the station.
    #[serde(default)]
    pub short_name: String,

    /// Latitude (WGS84).
    #[serde(default)]
    pub lat: Option<f64>,

    /// Longitude (WGS84).
    #[serde(default)]
    pub lon: Option<f64>,

    /// Number of docks at the station.
    #[serde(default)]
    pub capacity: u32,

    /// Whether the station can charge e-bikes.
    #[serde(default)]
    pub is_charging: bool,
}

fn default_name() -> String {
    "Unknown Station".to_string()
}

/// Live station availability.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StationStatus {
    /// Station identifier, matching `StationInfo::station_id`.
    pub station_id: String,

    /// All bikes available for rental, e-bikes included.
    #[serde(rename = "num_bikes_available", default)]
    pub bikes_available: u32,

    #[serde(rename = "num_ebikes_available", default)]
    pub ebikes_available: u32,

    #[serde(rename = "num_docks_available", default)]
    pub docks_available: u32,

    /// Feeds send these flags as booleans (GBFS 2.x) or 0/1 (1.x).
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_installed: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_renting: Option<bool>,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_returning: Option<bool>,

    /// Unix timestamp of the station's last report.
    #[serde(default)]
    pub last_reported: Option<i64>,
}

impl StationStatus {
    /// The status used for a station that is missing from the status feed:
    /// zero counts, unset flags and no report time.
    pub fn unreported(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            bikes_available: 0,
            ebikes_available: 0,
            docks_available: 0,
            is_installed: None,
            is_renting: None,
            is_returning: None,
            last_reported: None,
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
    }

    Ok(
        Option::<RawFlag>::deserialize(deserializer)?.map(|raw| match raw {
            RawFlag::Bool(b) => b,
            RawFlag::Int(n) => n != 0,
        }),
    )
}
