//! Even-odd ray casting over planar lat/lng rings.
//!
//! Both predicates are total: degenerate rings never error, they simply
//! enclose nothing. Points lying exactly on an edge may land on either side
//! depending on rounding in the crossing computation.

use crate::models::GeoPoint;

/// Check if a point is inside a ring using the even-odd rule.
///
/// A horizontal ray is cast from `point` towards increasing longitude and
/// every edge it crosses toggles the result. An edge only counts when exactly
/// one endpoint lies strictly north of the point, so a ray passing through a
/// shared vertex is counted once.
///
/// Rings with fewer than three vertices have no interior and return `false`.
pub fn point_in_polygon(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].lng, polygon[i].lat);
        let (xj, yj) = (polygon[j].lng, polygon[j].lat);

        if (yi > point.lat) != (yj > point.lat) {
            // yi != yj here, the straddle test guarantees it
            let crossing = (xj - xi) * (point.lat - yi) / (yj - yi) + xi;
            if point.lng < crossing {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Check if every vertex of `inner` lies inside `outer`.
///
/// Only vertices are sampled: an edge of `inner` that leaves a concave
/// `outer` between two contained vertices is not detected. An empty `inner`
/// is vacuously contained.
pub fn polygon_inside(inner: &[GeoPoint], outer: &[GeoPoint]) -> bool {
    inner.iter().all(|vertex| point_in_polygon(*vertex, outer))
}
