//! Site records as stored by the dashboard backend.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{GeoPoint, GeoPolygon};

/// Colour class applied to a zone when none is chosen
pub const DEFAULT_ZONE_COLOR: &str = "bg-success";

pub(crate) fn default_zone_color() -> String {
    DEFAULT_ZONE_COLOR.to_string()
}

/// A geofenced site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub boundary: GeoPolygon,

    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl Location {
    /// Load a JSON array of locations, as exported by the dashboard backend
    pub fn load_all_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Location>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read sites file {}", path.display()))?;
        let locations: Vec<Location> =
            serde_json::from_str(&content).context("Failed to parse sites file")?;
        Ok(locations)
    }

    pub fn zone(&self, zone_id: i64) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    /// Total poles across every zone
    pub fn pole_count(&self) -> usize {
        self.zones.iter().map(|z| z.poles.len()).sum()
    }
}

/// A geofenced sub-area of a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,

    #[serde(default = "default_zone_color")]
    pub border_color: String,

    #[serde(default = "default_zone_color")]
    pub fill_color: String,

    pub coordinates: GeoPolygon,

    #[serde(default)]
    pub poles: Vec<Pole>,
}

/// Physical mounting point inside a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pole {
    pub id: i64,
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_vpn_ip: Option<String>,

    pub lat: f64,
    pub lng: f64,

    #[serde(default)]
    pub cameras: Vec<Camera>,
}

impl Pole {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Camera mounted on a pole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub id: i64,
    pub camera_ip: String,
    pub number_of_parking: u32,
}
