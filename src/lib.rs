//! Sitefence - geofence validation for camera-monitored parking sites
//!
//! This library provides the shared types and modules for the server and
//! audit binaries: polygon containment, site models, form validation rules
//! and a spatial index over location boundaries.

pub mod config;
pub mod fence;
pub mod models;
pub mod validate;

pub use fence::{point_in_polygon, polygon_inside};
pub use models::{GeoPoint, GeoPolygon, Location, Pole, Zone};
