//! Spatial index for fast location boundary lookups.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use super::point_in_polygon;
use crate::models::{GeoPoint, Location};

/// Wrapper for R-tree indexing of location boundaries
#[derive(Clone)]
struct IndexedLocation {
    location: Arc<Location>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedLocation {
    /// `None` when the boundary has no vertices to bound
    fn new(location: Location) -> Option<Self> {
        let bbox = location.boundary.bbox()?;
        Some(Self {
            location: Arc::new(location),
            envelope: AABB::from_corners([bbox.min_lng, bbox.min_lat], [bbox.max_lng, bbox.max_lat]),
        })
    }
}

/// Spatial index for location boundaries using R-tree
pub struct SiteIndex {
    tree: RTree<IndexedLocation>,
}

impl SiteIndex {
    /// Build spatial index from locations
    pub fn build(locations: Vec<Location>) -> Self {
        info!("Building site index for {} locations...", locations.len());

        let indexed: Vec<IndexedLocation> = locations
            .into_iter()
            .filter_map(|location| {
                let id = location.id;
                let indexed = IndexedLocation::new(location);
                if indexed.is_none() {
                    warn!("Location {} has an empty boundary, not indexed", id);
                }
                indexed
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Site index built with {} entries", tree.size());

        Self { tree }
    }

    /// Find all locations whose boundary contains a point, ordered by id
    pub fn lookup(&self, point: GeoPoint) -> Vec<Arc<Location>> {
        let query_envelope = AABB::from_point([point.lng, point.lat]);

        // Envelope candidates first, then the exact ray cast
        let mut found: Vec<Arc<Location>> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|il| point_in_polygon(point, &il.location.boundary))
            .map(|il| Arc::clone(&il.location))
            .collect();
        found.sort_by_key(|l| l.id);
        found
    }

    /// Get total number of indexed locations
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPolygon;

    fn location(id: i64, lat: f64, lng: f64, size: f64) -> Location {
        Location {
            id,
            name: format!("site-{}", id),
            address: None,
            boundary: GeoPolygon::new(vec![
                GeoPoint::new(lat, lng),
                GeoPoint::new(lat, lng + size),
                GeoPoint::new(lat + size, lng + size),
                GeoPoint::new(lat + size, lng),
            ]),
            zones: vec![],
        }
    }

    #[test]
    fn test_empty_boundary_is_skipped() {
        let mut empty = location(1, 0.0, 0.0, 1.0);
        empty.boundary = GeoPolygon::default();
        let index = SiteIndex::build(vec![empty, location(2, 0.0, 0.0, 1.0)]);
        assert_eq!(index.len(), 1);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_lookup() {
        let index = SiteIndex::build(vec![
            location(1, 0.0, 0.0, 10.0),
            location(2, 20.0, 20.0, 5.0),
            location(3, 2.0, 2.0, 2.0),
        ]);

        let hits: Vec<i64> = index.lookup(GeoPoint::new(3.0, 3.0)).iter().map(|l| l.id).collect();
        assert_eq!(hits, vec![1, 3]);

        let hits: Vec<i64> = index.lookup(GeoPoint::new(22.0, 22.0)).iter().map(|l| l.id).collect();
        assert_eq!(hits, vec![2]);

        assert!(index.lookup(GeoPoint::new(15.0, 15.0)).is_empty());
    }

    #[test]
    fn test_bbox_hit_but_outside_ring() {
        // triangle: bbox covers (9, 1) but the ring does not
        let mut triangle = location(1, 0.0, 0.0, 10.0);
        triangle.boundary = GeoPolygon::new(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
        ]);
        let index = SiteIndex::build(vec![triangle]);
        assert!(index.lookup(GeoPoint::new(9.0, 1.0)).is_empty());
        assert_eq!(index.lookup(GeoPoint::new(1.0, 9.0)).len(), 1);
    }
}
