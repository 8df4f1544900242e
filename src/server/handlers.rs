//! Request handlers and wire types.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sitefence::fence::{point_in_polygon, polygon_inside, SiteIndex, SiteLocator, SiteMatch};
use sitefence::models::{GeoPoint, GeoPolygon, Location, MapView};
use sitefence::validate::{
    validate_camera, validate_location, validate_pole, validate_zone, validate_zone_edit,
    CameraDraft, FieldErrors, LocationDraft, PoleDraft, ZoneDraft,
};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    sites_loaded: bool,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sites_loaded: state.locator.is_some(),
    })
}

#[derive(Deserialize)]
pub struct ContainsPointRequest {
    point: GeoPoint,
    polygon: GeoPolygon,
}

#[derive(Deserialize)]
pub struct ContainsPolygonRequest {
    inner: GeoPolygon,
    outer: GeoPolygon,
}

#[derive(Debug, Serialize)]
pub struct ContainsResponse {
    inside: bool,
}

/// Raw point-in-polygon test
pub async fn contains_point_handler(
    Json(req): Json<ContainsPointRequest>,
) -> Json<ContainsResponse> {
    Json(ContainsResponse {
        inside: point_in_polygon(req.point, &req.polygon),
    })
}

/// Raw vertex-sampling containment test
pub async fn contains_polygon_handler(
    Json(req): Json<ContainsPolygonRequest>,
) -> Json<ContainsResponse> {
    Json(ContainsResponse {
        inside: polygon_inside(&req.inner, &req.outer),
    })
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    valid: bool,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    errors: FieldErrors,
}

fn validation_response(result: Result<(), FieldErrors>) -> (StatusCode, Json<ValidationResponse>) {
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(ValidationResponse {
                valid: true,
                errors: FieldErrors::default(),
            }),
        ),
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationResponse {
                valid: false,
                errors,
            }),
        ),
    }
}

pub async fn validate_location_handler(
    Json(draft): Json<LocationDraft>,
) -> (StatusCode, Json<ValidationResponse>) {
    validation_response(validate_location(&draft))
}

#[derive(Deserialize)]
pub struct ZoneValidationRequest {
    zone: ZoneDraft,
    boundary: GeoPolygon,
}

pub async fn validate_zone_handler(
    Json(req): Json<ZoneValidationRequest>,
) -> (StatusCode, Json<ValidationResponse>) {
    validation_response(validate_zone(&req.zone, &req.boundary))
}

#[derive(Deserialize)]
pub struct ZoneEditRequest {
    coordinates: GeoPolygon,
    boundary: GeoPolygon,
}

/// Re-validation fired on every vertex drag of an existing zone
pub async fn validate_zone_edit_handler(
    Json(req): Json<ZoneEditRequest>,
) -> (StatusCode, Json<ValidationResponse>) {
    let result = validate_zone_edit(&req.coordinates, &req.boundary).map_err(|e| {
        let mut errors = FieldErrors::default();
        errors.insert("coordinates", e);
        errors
    });
    validation_response(result)
}

#[derive(Deserialize)]
pub struct PoleValidationRequest {
    pole: PoleDraft,
    /// Ring of the selected zone, absent if the dashboard could not resolve it
    #[serde(default)]
    zone: Option<GeoPolygon>,
}

pub async fn validate_pole_handler(
    Json(req): Json<PoleValidationRequest>,
) -> (StatusCode, Json<ValidationResponse>) {
    validation_response(validate_pole(&req.pole, req.zone.as_ref().map(|z| z.points())))
}

pub async fn validate_camera_handler(
    Json(draft): Json<CameraDraft>,
) -> (StatusCode, Json<ValidationResponse>) {
    validation_response(validate_camera(&draft))
}

#[derive(Deserialize)]
pub struct ViewRequest {
    #[serde(default)]
    boundary: GeoPolygon,
}

/// Where to centre the map for a boundary
pub async fn view_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ViewRequest>,
) -> Json<MapView> {
    Json(MapView::for_boundary(
        &req.boundary,
        state.map.default_center,
        state.map.default_zoom,
    ))
}

#[derive(Deserialize)]
pub struct LocateParams {
    lat: f64,
    lng: f64,
}

/// Resolve a point to its location, zone and nearest pole
pub async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateParams>,
) -> Result<Json<SiteMatch>, (StatusCode, String)> {
    let locator = state.locator.as_ref().ok_or_else(|| {
        warn!("Locate requested but no sites are loaded");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "No sites loaded".to_string(),
        )
    })?;

    located(locator, GeoPoint::new(params.lat, params.lng))
}

#[derive(Deserialize)]
pub struct LocateRequest {
    sites: Vec<Location>,
    point: GeoPoint,
}

/// Resolve a point against the sites sent with the request
pub async fn locate_sites_handler(
    Json(req): Json<LocateRequest>,
) -> Result<Json<SiteMatch>, (StatusCode, String)> {
    let locator = SiteLocator::new(SiteIndex::build(req.sites));
    located(&locator, req.point)
}

fn located(
    locator: &SiteLocator,
    point: GeoPoint,
) -> Result<Json<SiteMatch>, (StatusCode, String)> {
    match locator.locate(point) {
        Some(found) => Ok(Json(found)),
        None => {
            debug!("No location contains ({}, {})", point.lat, point.lng);
            Err((
                StatusCode::NOT_FOUND,
                "Point is not inside any location".to_string(),
            ))
        }
    }
}
