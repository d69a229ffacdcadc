//! Bike-share station availability server.
//!
//! Polls a GBFS system's station information and status feeds, merges them
//! into a snapshot with per-station availability classification, and serves
//! the latest snapshot as GeoJSON.

pub mod classify;
pub mod config;
pub mod gbfs;
pub mod merge;
pub mod refresh;
pub mod snapshot;
pub mod web;
