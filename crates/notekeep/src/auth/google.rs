// Google OAuth flow: build the authorization redirect, then handle the
// callback by exchanging the code, fetching the profile, and provisioning a
// local account on first sign-in. OAuth sessions are short-lived (1 hour)
// compared to the 7-day password/OTP sessions.
//
// The `state` parameter doubles as a CSRF challenge: it is issued into the
// challenge store before the redirect and consumed on callback, so a forged
// callback with an unknown state is rejected before any provider traffic.

use serde::Deserialize;

use notekeep_core::db::{schema, StoreError, User};
use notekeep_core::error::{ApiError, ErrorCode, NotekeepError};

use crate::auth::{find_user_by_email, issue_session, AuthSuccess};
use crate::context::AppContext;
use crate::crypto::jwt::OAUTH_TTL_SECS;
use crate::crypto::random::generate_random_string;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const STATE_LENGTH: usize = 32;
const STATE_PROVIDER: &str = "google";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Where the browser lands after the flow, success or failure.
pub fn success_redirect(frontend_url: &str, token: &str) -> String {
    format!("{frontend_url}/auth/callback?token={token}")
}

pub fn failure_redirect(frontend_url: &str) -> String {
    format!("{frontend_url}/signin?error=oauth_failed")
}

/// Build the provider authorization URL, registering a fresh CSRF state in
/// the challenge store.
pub async fn authorization_url(ctx: &AppContext) -> Result<String, ApiError> {
    let state = generate_random_string(STATE_LENGTH);
    ctx.challenges
        .issue(&state, STATE_PROVIDER.to_string())
        .await;

    let mut url = url::Url::parse(GOOGLE_AUTH_ENDPOINT)
        .map_err(|e| oauth_failed(NotekeepError::Other(e.to_string())))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &ctx.config.google.client_id)
        .append_pair("redirect_uri", &ctx.config.google.redirect_url)
        .append_pair("scope", "openid email profile")
        .append_pair("state", &state);

    Ok(url.into())
}

/// Handle the provider callback. Returns the frontend URL to redirect the
/// browser to on success; any failure is an `ApiError` the HTTP layer turns
/// into the failure redirect.
pub async fn handle_callback(
    ctx: &AppContext,
    code: Option<String>,
    state: Option<String>,
) -> Result<String, ApiError> {
    let (Some(code), Some(state)) = (code, state) else {
        return Err(ApiError::bad_request(ErrorCode::OauthFailed));
    };

    if !ctx.challenges.verify(&state, STATE_PROVIDER).await {
        tracing::warn!("Google callback with unknown or replayed state");
        return Err(ApiError::bad_request(ErrorCode::OauthFailed));
    }

    let access_token = exchange_code(ctx, &code).await?;
    let profile = fetch_profile(&access_token).await?;

    let user = find_or_provision(ctx, profile).await?;
    let success = issue_session(&user, &ctx.config.jwt_secret, OAUTH_TTL_SECS)
        .map_err(oauth_failed)?;

    Ok(success_redirect(&ctx.config.frontend_url, &success.token))
}

async fn exchange_code(ctx: &AppContext, code: &str) -> Result<String, ApiError> {
    let client = reqwest::Client::new();
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", ctx.config.google.redirect_url.as_str()),
        ("client_id", ctx.config.google.client_id.as_str()),
        ("client_secret", ctx.config.google.client_secret.as_str()),
    ];

    let response = client
        .post(GOOGLE_TOKEN_ENDPOINT)
        .form(&form)
        .send()
        .await
        .map_err(|e| oauth_failed(NotekeepError::Other(format!("token endpoint: {e}"))))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(oauth_failed(NotekeepError::Other(format!(
            "token endpoint returned {status}: {body}"
        ))));
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .map_err(|e| oauth_failed(NotekeepError::Other(format!("token response: {e}"))))?;
    Ok(tokens.access_token)
}

async fn fetch_profile(access_token: &str) -> Result<GoogleProfile, ApiError> {
    let client = reqwest::Client::new();
    let response = client
        .get(GOOGLE_USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| oauth_failed(NotekeepError::Other(format!("userinfo endpoint: {e}"))))?;

    if !response.status().is_success() {
        return Err(oauth_failed(NotekeepError::Other(format!(
            "userinfo endpoint returned {}",
            response.status()
        ))));
    }

    response
        .json()
        .await
        .map_err(|e| oauth_failed(NotekeepError::Other(format!("userinfo response: {e}"))))
}

/// Look up the profile's email, creating a passwordless account on first
/// sign-in. A lost creation race falls back to the record that won.
async fn find_or_provision(ctx: &AppContext, profile: GoogleProfile) -> Result<User, ApiError> {
    if let Some(user) = find_user_by_email(ctx.adapter.as_ref(), &profile.email)
        .await
        .map_err(oauth_failed)?
    {
        return Ok(user);
    }

    let name = profile
        .name
        .clone()
        .unwrap_or_else(|| display_name_from_email(&profile.email));
    let user = User::new(name, &profile.email, None, None);

    let doc = user.to_doc().map_err(oauth_failed)?;
    match ctx.adapter.create(schema::USERS, doc).await {
        Ok(_) => Ok(user),
        Err(StoreError::Duplicate(_)) => find_user_by_email(ctx.adapter.as_ref(), &profile.email)
            .await
            .map_err(oauth_failed)?
            .ok_or_else(|| ApiError::bad_request(ErrorCode::OauthFailed)),
        Err(e) => Err(oauth_failed(e)),
    }
}

fn display_name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

fn oauth_failed<E: std::fmt::Display>(e: E) -> ApiError {
    tracing::error!(error = %e, "Google sign-in failed");
    ApiError::bad_request(ErrorCode::OauthFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::otp_ctx;

    #[tokio::test]
    async fn authorization_url_carries_client_and_state() {
        let (ctx, _mailer) = otp_ctx();
        let raw = authorization_url(&ctx).await.unwrap();
        let url = url::Url::parse(&raw).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("client_id").map(String::as_str), Some("client-id"));
        assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));

        // The state in the URL is the one registered as a challenge.
        let state = pairs.get("state").unwrap();
        assert!(ctx.challenges.verify(state, STATE_PROVIDER).await);
    }

    #[tokio::test]
    async fn callback_rejects_missing_parameters() {
        let (ctx, _mailer) = otp_ctx();
        let err = handle_callback(&ctx, None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OauthFailed);
    }

    #[tokio::test]
    async fn callback_rejects_unknown_state() {
        let (ctx, _mailer) = otp_ctx();
        let err = handle_callback(&ctx, Some("code".into()), Some("forged-state".into()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OauthFailed);
    }

    #[test]
    fn redirect_targets() {
        assert_eq!(
            success_redirect("http://localhost:5173", "abc"),
            "http://localhost:5173/auth/callback?token=abc"
        );
        assert_eq!(
            failure_redirect("http://localhost:5173"),
            "http://localhost:5173/signin?error=oauth_failed"
        );
    }
}
