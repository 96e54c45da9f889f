// Axum HTTP surface for notekeep.
//
// Builds the full API router under `/api`: auth flows, the notes CRUD
// surface, and a health check. CORS is locked to the configured frontend
// origin with credentials, matching what the browser client sends.

pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use notekeep::AppContext;
use notekeep_core::error::{ApiError, HttpStatus, NotekeepError};

/// Newtype so `ApiError` can implement Axum's `IntoResponse` from here.
#[derive(Debug)]
pub struct ErrorResponse(pub ApiError);

impl From<ApiError> for ErrorResponse {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

fn status_code(status: HttpStatus) -> StatusCode {
    StatusCode::from_u16(status.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (status_code(self.0.status), Json(self.0.to_json())).into_response()
    }
}

/// Build the application router.
///
/// Fails if the configured frontend URL is not a valid CORS origin; that is
/// a deployment mistake better caught at startup than per request.
pub fn router(ctx: Arc<AppContext>) -> Result<Router, NotekeepError> {
    let origin = ctx
        .config
        .frontend_url
        .parse::<HeaderValue>()
        .map_err(|e| NotekeepError::Config(format!("invalid frontend URL: {e}")))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let auth = Router::new()
        .route("/signup", post(routes::signup))
        .route("/signin", post(routes::signin))
        .route("/me", get(routes::me))
        .route("/send-otp", post(routes::send_otp))
        .route("/resend-otp", post(routes::resend_otp))
        .route("/verify-otp", post(routes::verify_otp))
        .route("/google", get(routes::google_start))
        .route("/callback/google", get(routes::google_callback));

    let notes = Router::new()
        .route("/", get(routes::list_notes).post(routes::create_note))
        .route("/{id}", axum::routing::delete(routes::delete_note));

    let api = Router::new()
        .route("/health", get(routes::health))
        .nest("/auth", auth)
        .nest("/notes", notes);

    Ok(Router::new()
        .nest("/api", api)
        .fallback(routes::not_found)
        .layer(cors)
        .with_state(ctx))
}
