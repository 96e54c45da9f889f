// Sign-up flow.
//
// OTP mode is a two-step cycle: the first request (no code) challenges the
// email and creates nothing; the second (with the code) verifies the
// challenge and only then creates the user record. Password mode registers
// in one step with a hashed password.

use notekeep_core::db::{schema, StoreError, User};
use notekeep_core::error::{ApiError, ErrorCode};

use crate::auth::request::{SignUpAction, SignUpBody, SignupProfile};
use crate::auth::{find_user_by_email, issue_session, server_error, AuthSuccess};
use crate::context::AppContext;
use crate::crypto::jwt::SESSION_TTL_SECS;
use crate::crypto::password::hash_password;
use crate::otp::generate_otp;

const SIGN_UP_FAILED: &str = "Server error during registration";

/// What a sign-up request produced.
#[derive(Debug)]
pub enum SignUpOutcome {
    /// Challenge issued and mailed; no user record exists yet.
    OtpSent,
    /// User created and signed in.
    Created(AuthSuccess),
}

pub async fn handle_sign_up(
    ctx: &AppContext,
    body: SignUpBody,
) -> Result<SignUpOutcome, ApiError> {
    match body.into_action(ctx.config.auth_mode)? {
        SignUpAction::Initiate(profile) => initiate(ctx, profile).await,
        SignUpAction::Complete { profile, otp } => complete(ctx, profile, otp).await,
        SignUpAction::Password {
            name,
            email,
            password,
        } => password_sign_up(ctx, name, email, password).await,
    }
}

async fn initiate(ctx: &AppContext, profile: SignupProfile) -> Result<SignUpOutcome, ApiError> {
    let existing = find_user_by_email(ctx.adapter.as_ref(), &profile.email)
        .await
        .map_err(server_error(SIGN_UP_FAILED))?;
    if existing.is_some() {
        return Err(ApiError::bad_request(ErrorCode::UserAlreadyExists));
    }

    let email = profile.email.to_lowercase();
    let code = generate_otp();
    ctx.challenges.issue(&email, code.clone()).await;

    ctx.mailer
        .send_otp(&email, &code)
        .await
        .map_err(server_error(SIGN_UP_FAILED))?;

    Ok(SignUpOutcome::OtpSent)
}

async fn complete(
    ctx: &AppContext,
    profile: SignupProfile,
    otp: String,
) -> Result<SignUpOutcome, ApiError> {
    let email = profile.email.to_lowercase();
    if !ctx.challenges.verify(&email, &otp).await {
        return Err(ApiError::bad_request(ErrorCode::InvalidOtp));
    }

    // Re-check: another request may have registered this email between the
    // challenge and now. The store's unique index is the real backstop.
    let existing = find_user_by_email(ctx.adapter.as_ref(), &email)
        .await
        .map_err(server_error(SIGN_UP_FAILED))?;
    if existing.is_some() {
        return Err(ApiError::bad_request(ErrorCode::UserAlreadyExists));
    }

    let user = User::new(profile.name, &email, Some(profile.date_of_birth), None);
    insert_user(ctx, &user).await?;

    let success = issue_session(&user, &ctx.config.jwt_secret, SESSION_TTL_SECS)
        .map_err(server_error(SIGN_UP_FAILED))?;
    Ok(SignUpOutcome::Created(success))
}

async fn password_sign_up(
    ctx: &AppContext,
    name: String,
    email: String,
    password: String,
) -> Result<SignUpOutcome, ApiError> {
    let existing = find_user_by_email(ctx.adapter.as_ref(), &email)
        .await
        .map_err(server_error(SIGN_UP_FAILED))?;
    if existing.is_some() {
        return Err(ApiError::bad_request(ErrorCode::UserAlreadyExists));
    }

    let hash = hash_password(&password).map_err(server_error(SIGN_UP_FAILED))?;
    let user = User::new(name, &email, None, Some(hash));
    insert_user(ctx, &user).await?;

    let success = issue_session(&user, &ctx.config.jwt_secret, SESSION_TTL_SECS)
        .map_err(server_error(SIGN_UP_FAILED))?;
    Ok(SignUpOutcome::Created(success))
}

/// Insert the user, mapping a unique-index rejection to the same outcome as
/// the pre-check. A lost race is a duplicate registration, not a 500.
async fn insert_user(ctx: &AppContext, user: &User) -> Result<(), ApiError> {
    let doc = user.to_doc().map_err(server_error(SIGN_UP_FAILED))?;
    match ctx.adapter.create(schema::USERS, doc).await {
        Ok(_) => Ok(()),
        Err(StoreError::Duplicate(_)) => Err(ApiError::bad_request(ErrorCode::UserAlreadyExists)),
        Err(e) => Err(server_error(SIGN_UP_FAILED)(e)),
    }
}
