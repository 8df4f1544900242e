//! Geofencing: polygon containment and point-to-site lookup.
//!
//! Validates that zones lie inside their location boundary and that poles
//! lie inside their zone, and resolves points to sites using an R-tree over
//! location boundaries.

mod containment;
mod index;
mod service;

pub use containment::{point_in_polygon, polygon_inside};
pub use index::SiteIndex;
pub use service::{zone_containing, PoleMatch, SiteLocator, SiteMatch};
