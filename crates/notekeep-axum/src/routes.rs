// Route handlers. Thin: deserialize, delegate to the notekeep services,
// shape the `{success, ...}` response envelope.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use notekeep::auth::request::{SignInBody, SignUpBody};
use notekeep::auth::sign_in::{handle_sign_in, SignInOutcome};
use notekeep::auth::sign_up::{handle_sign_up, SignUpOutcome};
use notekeep::auth::{google, otp_routes, session, AuthSuccess};
use notekeep::{notes, AppContext};
use notekeep_core::error::{ApiError, ErrorCode};

use crate::extract::AuthUser;
use crate::ErrorResponse;

const OTP_SENT: &str = "OTP sent to your email";

#[derive(Debug, Deserialize)]
pub struct EmailBody {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    pub email: Option<String>,
    pub otp: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

fn redirect_found(url: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

fn token_response(success: &AuthSuccess) -> serde_json::Value {
    json!({
        "success": true,
        "message": "User registered successfully",
        "user": success.user,
        "token": success.token,
    })
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "notekeep API is running!",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> impl IntoResponse {
    ErrorResponse(ApiError::not_found(ErrorCode::RouteNotFound))
}

pub async fn signup(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<SignUpBody>,
) -> Result<Response, ErrorResponse> {
    match handle_sign_up(&ctx, body).await? {
        SignUpOutcome::OtpSent => {
            Ok(Json(json!({"success": true, "message": OTP_SENT})).into_response())
        }
        SignUpOutcome::Created(success) => {
            Ok((StatusCode::CREATED, Json(token_response(&success))).into_response())
        }
    }
}

pub async fn signin(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<SignInBody>,
) -> Result<Response, ErrorResponse> {
    match handle_sign_in(&ctx, body).await? {
        SignInOutcome::OtpSent => {
            Ok(Json(json!({"success": true, "message": OTP_SENT})).into_response())
        }
        SignInOutcome::SignedIn(success) => Ok(Json(token_response(&success)).into_response()),
    }
}

pub async fn me(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, ErrorResponse> {
    let user = session::current_user(&ctx, &identity).await?;
    Ok(Json(json!({"success": true, "user": user})))
}

pub async fn send_otp(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<EmailBody>,
) -> Result<impl IntoResponse, ErrorResponse> {
    otp_routes::handle_send_otp(&ctx, body.email).await?;
    Ok(Json(json!({"message": "OTP sent"})))
}

pub async fn resend_otp(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<EmailBody>,
) -> Result<impl IntoResponse, ErrorResponse> {
    otp_routes::handle_resend_otp(&ctx, body.email).await?;
    Ok(Json(json!({
        "success": true,
        "message": "New OTP sent to your email",
    })))
}

pub async fn verify_otp(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<impl IntoResponse, ErrorResponse> {
    otp_routes::handle_verify_otp(&ctx, body.email, body.otp).await?;
    Ok(Json(json!({"message": "OTP verified, login success"})))
}

pub async fn google_start(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Response, ErrorResponse> {
    let url = google::authorization_url(&ctx).await?;
    Ok(redirect_found(&url))
}

/// OAuth callback. Failures redirect to the frontend's failure page rather
/// than rendering a JSON error, since the caller here is a browser.
pub async fn google_callback(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match google::handle_callback(&ctx, query.code, query.state).await {
        Ok(url) => redirect_found(&url),
        Err(e) => {
            tracing::warn!(error = %e, "Google callback failed");
            redirect_found(&google::failure_redirect(&ctx.config.frontend_url))
        }
    }
}

pub async fn list_notes(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, ErrorResponse> {
    let notes = notes::list_notes(&ctx, &identity).await?;
    Ok(Json(json!({"success": true, "notes": notes})))
}

pub async fn create_note(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let note = notes::create_note(&ctx, &identity, body.note).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "note": note})),
    ))
}

pub async fn delete_note(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let note = notes::delete_note(&ctx, &identity, &id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Note deleted",
        "note": note,
    })))
}
