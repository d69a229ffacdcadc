//! GBFS feed client.
//!
//! Fetches the two station feeds of a GBFS system: `station_information`
//! (static metadata: location, name, capacity) and `station_status` (live
//! counts). Both are requested together under one shared deadline so a
//! refresh cycle always sees a matching pair.

mod client;
mod error;
mod types;

pub use client::{FeedSource, GbfsClient, GbfsConfig};
pub use error::{FeedKind, FetchError};
pub use types::{Feed, FeedData, InfoPayload, StationInfo, StationStatus, StatusPayload};
