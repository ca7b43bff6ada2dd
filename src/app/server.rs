use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest as _, Sha256};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregate::Refresher;
use crate::model::{Location, SiteDataDocument};
use crate::narrative;
use crate::store::DocumentStore;

pub const NOT_FOUND_MESSAGE: &str = "No site data found.";
pub const MISSING_COORDINATES_MESSAGE: &str = "Missing lat/lng coordinates";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub refresher: Arc<Refresher>,
    /// Bearer token `POST /refresh` must present; `None` disables the route.
    pub refresh_secret: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::IF_NONE_MATCH,
        ])
        .expose_headers([header::ETAG]);

    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/site-data", get(get_site_data))
        .route("/narrative", get(get_narrative))
        .route("/refresh", post(refresh))
        .route("/location", post(update_location))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn load_latest(state: &AppState) -> Result<SiteDataDocument, (StatusCode, String)> {
    match state.store.latest().await {
        Ok(Some(document)) => Ok(document),
        Ok(None) => Err((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_owned())),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "load site data");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error retrieving data.".to_owned(),
            ))
        }
    }
}

fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

fn if_none_match_hits(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

async fn get_site_data(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let document = load_latest(&state).await?;
    let body = serde_json::to_vec(&document).map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("serialize site data: {err}"),
        )
    })?;

    let etag = etag_for(&body);
    let etag_header = HeaderValue::from_str(&etag)
        .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "invalid etag".to_owned()))?;

    if if_none_match_hits(&headers, &etag) {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag_header)]).into_response());
    }

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (header::ETAG, etag_header),
        ],
        body,
    )
        .into_response())
}

async fn get_narrative(
    State(state): State<AppState>,
) -> Result<Json<narrative::Narrative>, (StatusCode, String)> {
    let document = load_latest(&state).await?;
    Ok(Json(narrative::render(&document, Utc::now())))
}

fn authorize_refresh(
    secret: Option<&str>,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, String)> {
    let Some(secret) = secret else {
        return Err((
            StatusCode::FORBIDDEN,
            "Manual refresh is disabled.".to_owned(),
        ));
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    match presented {
        Some(token) if Sha256::digest(token) == Sha256::digest(secret) => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            "Missing or invalid refresh token.".to_owned(),
        )),
    }
}

async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SiteDataDocument>, (StatusCode, String)> {
    authorize_refresh(state.refresh_secret.as_deref(), &headers)?;
    state.refresher.refresh().await.map(Json).map_err(|err| {
        tracing::error!(error = %format!("{err:#}"), "manual refresh");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("refresh failed: {err:#}"),
        )
    })
}

/// A number or a numeric string; browsers post either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
        .filter(|value: &f64| value.is_finite())
    }
}

#[derive(Debug, Deserialize)]
struct LocationUpdate {
    lat: Option<Coordinate>,
    lng: Option<Coordinate>,
}

async fn update_location(
    State(state): State<AppState>,
    Json(update): Json<LocationUpdate>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let lat = update.lat.as_ref().and_then(Coordinate::value);
    let lng = update.lng.as_ref().and_then(Coordinate::value);
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err((
            StatusCode::BAD_REQUEST,
            MISSING_COORDINATES_MESSAGE.to_owned(),
        ));
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err((
            StatusCode::BAD_REQUEST,
            "Coordinates out of range".to_owned(),
        ));
    }

    let location = Location {
        lat,
        lng,
        updated_at: Utc::now(),
    };
    state.store.put_location(&location).await.map_err(|err| {
        tracing::error!(error = %format!("{err:#}"), "store location");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error updating location".to_owned(),
        )
    })?;

    tracing::info!(lat, lng, "location updated");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Location updated",
    })))
}
