//! Locator service resolving a point to its location, zone and nearest pole.

use serde::Serialize;
use tracing::debug;

use super::{point_in_polygon, SiteIndex};
use crate::models::{GeoPoint, Location, Zone};

/// Pole closest to the looked-up point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoleMatch {
    pub id: i64,
    pub code: String,
    /// Planar distance in degrees
    pub distance: f64,
}

/// Result of a site lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteMatch {
    pub location_id: i64,
    pub location_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_pole: Option<PoleMatch>,
}

/// Point-to-site lookup service
pub struct SiteLocator {
    index: SiteIndex,
}

impl SiteLocator {
    /// Create a new locator from a site index
    pub fn new(index: SiteIndex) -> Self {
        Self { index }
    }

    /// Resolve the location containing a point, then the zone within it.
    ///
    /// Overlapping locations resolve to the lowest id; overlapping zones to
    /// the first one in stored order.
    pub fn locate(&self, point: GeoPoint) -> Option<SiteMatch> {
        let locations = self.index.lookup(point);

        debug!(
            "Site lookup at ({}, {}): {} candidate locations",
            point.lat,
            point.lng,
            locations.len()
        );

        let location = locations.first()?;
        let zone = zone_containing(location, point);

        Some(SiteMatch {
            location_id: location.id,
            location_name: location.name.clone(),
            zone_id: zone.map(|z| z.id),
            zone_name: zone.map(|z| z.name.clone()),
            nearest_pole: zone.and_then(|z| nearest_pole(z, point)),
        })
    }

    /// Get the site index (for stats/debugging)
    pub fn index(&self) -> &SiteIndex {
        &self.index
    }
}

/// First zone of a location whose ring contains the point
pub fn zone_containing(location: &Location, point: GeoPoint) -> Option<&Zone> {
    location
        .zones
        .iter()
        .find(|z| point_in_polygon(point, &z.coordinates))
}

fn nearest_pole(zone: &Zone, point: GeoPoint) -> Option<PoleMatch> {
    zone.poles
        .iter()
        .map(|pole| (pole, pole.position().planar_distance(&point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pole, distance)| PoleMatch {
            id: pole.id,
            code: pole.code.clone(),
            distance,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPolygon, Pole, DEFAULT_ZONE_COLOR};

    fn ring(lat: f64, lng: f64, size: f64) -> GeoPolygon {
        GeoPolygon::new(vec![
            GeoPoint::new(lat, lng),
            GeoPoint::new(lat, lng + size),
            GeoPoint::new(lat + size, lng + size),
            GeoPoint::new(lat + size, lng),
        ])
    }

    fn pole(id: i64, lat: f64, lng: f64) -> Pole {
        Pole {
            id,
            code: format!("P-{:02}", id),
            router_ip: None,
            router_vpn_ip: None,
            lat,
            lng,
            cameras: vec![],
        }
    }

    fn site() -> Location {
        Location {
            id: 1,
            name: "Downtown".to_string(),
            address: None,
            boundary: ring(0.0, 0.0, 10.0),
            zones: vec![Zone {
                id: 11,
                name: "North".to_string(),
                border_color: DEFAULT_ZONE_COLOR.to_string(),
                fill_color: DEFAULT_ZONE_COLOR.to_string(),
                coordinates: ring(5.0, 0.0, 5.0),
                poles: vec![pole(1, 6.0, 1.0), pole(2, 9.0, 4.0)],
            }],
        }
    }

    #[test]
    fn test_empty_locator() {
        let locator = SiteLocator::new(SiteIndex::build(vec![]));
        assert!(locator.locate(GeoPoint::new(25.2, 55.27)).is_none());
        assert!(locator.index().is_empty());
    }

    #[test]
    fn test_locate_zone_and_nearest_pole() {
        let locator = SiteLocator::new(SiteIndex::build(vec![site()]));
        let found = locator.locate(GeoPoint::new(8.5, 3.5)).unwrap();
        assert_eq!(found.location_id, 1);
        assert_eq!(found.zone_id, Some(11));
        assert_eq!(found.zone_name.as_deref(), Some("North"));
        assert_eq!(found.nearest_pole.unwrap().code, "P-02");
    }

    #[test]
    fn test_locate_outside_zones() {
        let locator = SiteLocator::new(SiteIndex::build(vec![site()]));
        let found = locator.locate(GeoPoint::new(2.0, 2.0)).unwrap();
        assert_eq!(found.location_name, "Downtown");
        assert!(found.zone_id.is_none());
        assert!(found.nearest_pole.is_none());
    }
}
