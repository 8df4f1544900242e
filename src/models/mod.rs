//! Core data models for sites and their geometry.

pub mod geometry;
pub mod site;

pub use geometry::{GeoBbox, GeoPoint, GeoPolygon, MapView};
pub use site::{Camera, Location, Pole, Zone, DEFAULT_ZONE_COLOR};
