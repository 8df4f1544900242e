//! Geographic primitives exchanged with the map-drawing surface.

use geo::BoundingRect;
use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Minimum vertices for a ring to enclose anything
const MIN_RING_POINTS: usize = 3;

/// Geographic point (lat/lng), in degrees.
///
/// Coordinates are treated as planar; no geodesic correction is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar distance in degrees. Only meaningful for ranking nearby points.
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        (self.lat - other.lat).hypot(self.lng - other.lng)
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

impl From<Coord<f64>> for GeoPoint {
    fn from(c: Coord<f64>) -> Self {
        GeoPoint { lat: c.y, lng: c.x }
    }
}

/// Closed ring of points. The edge from the last point back to the first is
/// implicit and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoPolygon(Vec<GeoPoint>);

impl GeoPolygon {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }

    /// Boundaries and zones with fewer vertices are rejected as too small.
    pub fn has_interior(&self) -> bool {
        self.0.len() >= MIN_RING_POINTS
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn into_points(self) -> Vec<GeoPoint> {
        self.0
    }

    /// Bounding box of the vertices, `None` for an empty ring
    pub fn bbox(&self) -> Option<GeoBbox> {
        let line: LineString<f64> = self.0.iter().copied().map(Coord::from).collect();
        line.bounding_rect().map(|rect| GeoBbox {
            min_lat: rect.min().y,
            min_lng: rect.min().x,
            max_lat: rect.max().y,
            max_lng: rect.max().x,
        })
    }

    /// Arithmetic mean of the vertices.
    ///
    /// This is what the dashboard centres the map on, not the area centroid.
    pub fn vertex_center(&self) -> Option<GeoPoint> {
        if self.0.is_empty() {
            return None;
        }
        let n = self.0.len() as f64;
        let (lat, lng) = self
            .0
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Some(GeoPoint::new(lat / n, lng / n))
    }

}

impl Deref for GeoPolygon {
    type Target = [GeoPoint];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<GeoPoint>> for GeoPolygon {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self(points)
    }
}

impl From<&Polygon<f64>> for GeoPolygon {
    /// Takes the exterior ring only, dropping the repeated closing vertex.
    fn from(polygon: &Polygon<f64>) -> Self {
        let coords = &polygon.exterior().0;
        let mut points: Vec<GeoPoint> = coords.iter().copied().map(GeoPoint::from).collect();
        if points.len() > 1 && coords.first() == coords.last() {
            points.pop();
        }
        Self(points)
    }
}

impl FromIterator<GeoPoint> for GeoPolygon {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBbox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

/// Where the map should be centred for a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
}

impl MapView {
    /// Centre on the boundary's vertex mean, falling back to `default_center`
    /// while nothing has been drawn yet.
    pub fn for_boundary(boundary: &GeoPolygon, default_center: GeoPoint, zoom: u8) -> Self {
        Self {
            center: boundary.vertex_center().unwrap_or(default_center),
            zoom,
        }
    }
}
