//! Form-level business rules applied before a site record is saved.
//!
//! The containment predicates answer a geometric question only. Deciding
//! that a two-point boundary is not a usable zone, and wording the message
//! the operator sees, happens here.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::fence::{point_in_polygon, polygon_inside};
use crate::models::site::default_zone_color;
use crate::models::{GeoPoint, GeoPolygon};

/// A single rejected field, displayed verbatim to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Please draw a valid boundary (at least 3 points)")]
    BoundaryTooSmall,
    #[error("Zone name is required")]
    ZoneNameRequired,
    #[error("Please draw a valid zone (at least 3 points)")]
    ZoneTooSmall,
    #[error("Zone must be completely inside the location boundary")]
    ZoneOutsideBoundary,
    #[error("Zone must remain completely inside the location boundary")]
    ZoneLeftBoundary,
    #[error("Pole code is required")]
    PoleCodeRequired,
    #[error("Please select a zone first")]
    ZoneRequired,
    #[error("Selected zone not found")]
    ZoneNotFound,
    #[error("Please click on the map to place the pole")]
    PolePositionRequired,
    #[error("Pole must be placed inside the selected zone")]
    PoleOutsideZone,
    #[error("Camera IP is required")]
    CameraIpRequired,
    #[error("Number of parking is required")]
    ParkingCountRequired,
    #[error("Please select a pole")]
    PoleRequired,
}

/// Every rejected field of a form, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, ValidationError>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, error: ValidationError) {
        self.0.insert(field, error);
    }

    pub fn get(&self, field: &str) -> Option<ValidationError> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            debug!("Form rejected: {}", self);
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, error) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, error)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Serialized as `{field: message}`, the shape the dashboard forms consume
impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, error) in &self.0 {
            map.serialize_entry(field, &error.to_string())?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub boundary: GeoPolygon,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_zone_color")]
    pub border_color: String,
    #[serde(default = "default_zone_color")]
    pub fill_color: String,
    #[serde(default)]
    pub coordinates: GeoPolygon,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoleDraft {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub zone_id: Option<i64>,
    #[serde(default)]
    pub router_ip: Option<String>,
    #[serde(default)]
    pub router_vpn_ip: Option<String>,
    #[serde(default)]
    pub position: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CameraDraft {
    #[serde(default)]
    pub camera_ip: String,
    #[serde(default)]
    pub number_of_parking: String,
    #[serde(default)]
    pub pole_id: Option<i64>,
}

pub fn validate_location(draft: &LocationDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if draft.name.trim().is_empty() {
        errors.insert("name", ValidationError::NameRequired);
    }
    if !draft.boundary.has_interior() {
        errors.insert("boundary", ValidationError::BoundaryTooSmall);
    }
    errors.into_result()
}

/// Validate a newly drawn zone against its location boundary
pub fn validate_zone(draft: &ZoneDraft, boundary: &[GeoPoint]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if draft.name.trim().is_empty() {
        errors.insert("name", ValidationError::ZoneNameRequired);
    }
    if !draft.coordinates.has_interior() {
        errors.insert("coordinates", ValidationError::ZoneTooSmall);
    } else if !polygon_inside(&draft.coordinates, boundary) {
        errors.insert("coordinates", ValidationError::ZoneOutsideBoundary);
    }
    errors.into_result()
}

/// Re-check applied while an existing zone's vertices are dragged
pub fn validate_zone_edit(
    coordinates: &[GeoPoint],
    boundary: &[GeoPoint],
) -> Result<(), ValidationError> {
    if polygon_inside(coordinates, boundary) {
        Ok(())
    } else {
        Err(ValidationError::ZoneLeftBoundary)
    }
}

/// Validate a pole placement. `zone` is the ring of the zone named by
/// `draft.zone_id`, or `None` if the caller could not find it.
pub fn validate_pole(draft: &PoleDraft, zone: Option<&[GeoPoint]>) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if draft.code.trim().is_empty() {
        errors.insert("code", ValidationError::PoleCodeRequired);
    }

    let zone = match (draft.zone_id, zone) {
        (None, _) => {
            errors.insert("zone", ValidationError::ZoneRequired);
            None
        }
        (Some(_), None) => {
            errors.insert("zone", ValidationError::ZoneNotFound);
            None
        }
        (Some(_), Some(ring)) => Some(ring),
    };

    match (draft.position, zone) {
        (None, _) => errors.insert("location", ValidationError::PolePositionRequired),
        (Some(position), Some(ring)) if !point_in_polygon(position, ring) => {
            errors.insert("location", ValidationError::PoleOutsideZone)
        }
        _ => {}
    }

    errors.into_result()
}

pub fn validate_camera(draft: &CameraDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if draft.camera_ip.trim().is_empty() {
        errors.insert("camera_ip", ValidationError::CameraIpRequired);
    }
    if draft.number_of_parking.trim().is_empty() {
        errors.insert("number_of_parking", ValidationError::ParkingCountRequired);
    }
    if draft.pole_id.is_none() {
        errors.insert("pole", ValidationError::PoleRequired);
    }
    errors.into_result()
}
