//! Validation server for the site dashboard.
//!
//! Exposes the containment predicates and the form validation rules over
//! HTTP so the map-drawing surface can re-validate on every edit, plus a
//! point-to-site lookup over a loaded sites export.

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sitefence::config::{Config, MapConfig};
use sitefence::fence::{SiteIndex, SiteLocator};
use sitefence::models::Location;

mod handlers;
use handlers::*;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Geofence validation server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,

    /// JSON export of locations to serve lookups from
    #[arg(long)]
    sites: Option<PathBuf>,
}

/// Application state shared across handlers
pub struct AppState {
    pub map: MapConfig,
    pub locator: Option<SiteLocator>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Sitefence Validation Server");

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };

    let locator = match &args.sites {
        Some(path) => {
            let locations = Location::load_all_from_file(path)?;
            info!("Loaded {} locations from {}", locations.len(), path.display());
            let locator = SiteLocator::new(SiteIndex::build(locations));
            info!("Serving lookups over {} indexed locations", locator.index().len());
            Some(locator)
        }
        None => None,
    };

    let state = Arc::new(AppState {
        map: config.map,
        locator,
    });

    let app = router(state);

    let listen = args.listen.unwrap_or(config.server.listen);
    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/contains/point", post(contains_point_handler))
        .route("/v1/contains/polygon", post(contains_polygon_handler))
        .route("/v1/validate/location", post(validate_location_handler))
        .route("/v1/validate/zone", post(validate_zone_handler))
        .route("/v1/validate/zone-edit", post(validate_zone_edit_handler))
        .route("/v1/validate/pole", post(validate_pole_handler))
        .route("/v1/validate/camera", post(validate_camera_handler))
        .route("/v1/view", post(view_handler))
        .route("/v1/locate", get(locate_handler).post(locate_sites_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(sites: Option<Value>) -> Router {
        let locator = sites.map(|sites| {
            let locations: Vec<Location> = serde_json::from_value(sites).unwrap();
            SiteLocator::new(SiteIndex::build(locations))
        });
        router(Arc::new(AppState {
            map: MapConfig::default(),
            locator,
        }))
    }

    fn square() -> Value {
        json!([
            {"lat": 0.0, "lng": 0.0},
            {"lat": 0.0, "lng": 10.0},
            {"lat": 10.0, "lng": 10.0},
            {"lat": 10.0, "lng": 0.0}
        ])
    }

    fn sites() -> Value {
        json!([{"id": 4, "name": "Harbour", "boundary": square()}])
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_uri(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(None), get_uri("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "sites_loaded": false}));

        let (_, body) = send(app(Some(sites())), get_uri("/health")).await;
        assert_eq!(body["sites_loaded"], true);
    }

    #[tokio::test]
    async fn test_contains_routes() {
        let (status, body) = send(
            app(None),
            post_json("/v1/contains/point", json!({"point": {"lat": 5.0, "lng": 5.0}, "polygon": square()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"inside": true}));

        let inner = json!([{"lat": 2.0, "lng": 2.0}, {"lat": 2.0, "lng": 8.0}, {"lat": 8.0, "lng": 8.0}]);
        let (status, body) = send(
            app(None),
            post_json("/v1/contains/polygon", json!({"inner": inner, "outer": square()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"inside": true}));
    }

    #[tokio::test]
    async fn test_validate_routes() {
        let (status, body) = send(
            app(None),
            post_json("/v1/validate/location", json!({"name": "Harbour", "boundary": square()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"valid": true}));

        let zone = json!({"name": "", "coordinates": [{"lat": 1.0, "lng": 1.0}]});
        let (status, body) = send(
            app(None),
            post_json("/v1/validate/zone", json!({"zone": zone, "boundary": square()})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"]["name"], "Zone name is required");

        let dragged = json!([{"lat": 2.0, "lng": 2.0}, {"lat": 2.0, "lng": 8.0}, {"lat": 12.0, "lng": 8.0}]);
        let (status, body) = send(
            app(None),
            post_json("/v1/validate/zone-edit", json!({"coordinates": dragged, "boundary": square()})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["coordinates"],
            "Zone must remain completely inside the location boundary"
        );

        let pole = json!({"code": "P-1", "zone_id": 3, "position": {"lat": 4.0, "lng": 4.0}});
        let (status, _) = send(
            app(None),
            post_json("/v1/validate/pole", json!({"pole": pole, "zone": square()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            app(None),
            post_json("/v1/validate/camera", json!({"camera_ip": "", "number_of_parking": "2", "pole_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["camera_ip"], "Camera IP is required");
    }

    #[tokio::test]
    async fn test_view_route() {
        let (status, body) = send(app(None), post_json("/v1/view", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["center"], json!({"lat": 25.1972, "lng": 55.2744}));
        assert_eq!(body["zoom"], 17);
    }

    #[tokio::test]
    async fn test_locate_post() {
        let (status, body) = send(
            app(None),
            post_json("/v1/locate", json!({"sites": sites(), "point": {"lat": 5.0, "lng": 5.0}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location_id"], 4);
        assert_eq!(body["location_name"], "Harbour");

        let (status, _) = send(
            app(None),
            post_json("/v1/locate", json!({"sites": sites(), "point": {"lat": 50.0, "lng": 5.0}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_locate_get_uses_loaded_sites() {
        let (status, _) = send(app(None), get_uri("/v1/locate?lat=5&lng=5")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) = send(app(Some(sites())), get_uri("/v1/locate?lat=5&lng=5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location_id"], 4);
    }
}
