// Sign-in flow.
//
// Mirrors sign-up but requires the identity to exist. Password mode answers
// the same 401 "Invalid email or password" whether the email is unknown or
// the password is wrong, and burns a dummy hash on the unknown-email path so
// response timing does not reveal which case occurred.

use notekeep_core::error::{ApiError, ErrorCode};

use crate::auth::request::{SignInAction, SignInBody};
use crate::auth::{find_user_by_email, issue_session, server_error, AuthSuccess};
use crate::context::AppContext;
use crate::crypto::jwt::SESSION_TTL_SECS;
use crate::crypto::password::{hash_password, verify_password};
use crate::otp::generate_otp;

const SIGN_IN_FAILED: &str = "Server error during sign in";

/// What a sign-in request produced.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Challenge issued and mailed.
    OtpSent,
    /// Token issued.
    SignedIn(AuthSuccess),
}

pub async fn handle_sign_in(
    ctx: &AppContext,
    body: SignInBody,
) -> Result<SignInOutcome, ApiError> {
    match body.into_action(ctx.config.auth_mode)? {
        SignInAction::Initiate { email } => initiate(ctx, email).await,
        SignInAction::Complete { email, otp } => complete(ctx, email, otp).await,
        SignInAction::Password { email, password } => {
            password_sign_in(ctx, email, password).await
        }
    }
}

async fn initiate(ctx: &AppContext, email: String) -> Result<SignInOutcome, ApiError> {
    let user = find_user_by_email(ctx.adapter.as_ref(), &email)
        .await
        .map_err(server_error(SIGN_IN_FAILED))?;
    if user.is_none() {
        return Err(ApiError::not_found(ErrorCode::UserNotFound));
    }

    let email = email.to_lowercase();
    let code = generate_otp();
    ctx.challenges.issue(&email, code.clone()).await;

    ctx.mailer
        .send_otp(&email, &code)
        .await
        .map_err(server_error(SIGN_IN_FAILED))?;

    Ok(SignInOutcome::OtpSent)
}

async fn complete(ctx: &AppContext, email: String, otp: String) -> Result<SignInOutcome, ApiError> {
    let email = email.to_lowercase();
    if !ctx.challenges.verify(&email, &otp).await {
        return Err(ApiError::bad_request(ErrorCode::InvalidOtp));
    }

    let user = find_user_by_email(ctx.adapter.as_ref(), &email)
        .await
        .map_err(server_error(SIGN_IN_FAILED))?
        .ok_or_else(|| ApiError::not_found(ErrorCode::UserNotFound))?;

    let success = issue_session(&user, &ctx.config.jwt_secret, SESSION_TTL_SECS)
        .map_err(server_error(SIGN_IN_FAILED))?;
    Ok(SignInOutcome::SignedIn(success))
}

async fn password_sign_in(
    ctx: &AppContext,
    email: String,
    password: String,
) -> Result<SignInOutcome, ApiError> {
    let user = find_user_by_email(ctx.adapter.as_ref(), &email)
        .await
        .map_err(server_error(SIGN_IN_FAILED))?;

    let Some(user) = user else {
        // Burn a hash so unknown-email responses take as long as
        // wrong-password ones.
        let _ = hash_password(&password);
        return Err(ApiError::unauthorized(ErrorCode::InvalidCredentials));
    };

    let Some(stored_hash) = user.password_hash.as_deref() else {
        // OAuth-provisioned account with no password set.
        let _ = hash_password(&password);
        return Err(ApiError::unauthorized(ErrorCode::InvalidCredentials));
    };

    let valid =
        verify_password(stored_hash, &password).map_err(server_error(SIGN_IN_FAILED))?;
    if !valid {
        return Err(ApiError::unauthorized(ErrorCode::InvalidCredentials));
    }

    let success = issue_session(&user, &ctx.config.jwt_secret, SESSION_TTL_SECS)
        .map_err(server_error(SIGN_IN_FAILED))?;
    Ok(SignInOutcome::SignedIn(success))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::sign_up::{handle_sign_up, SignUpOutcome};
    use crate::auth::test_support::{otp_ctx, password_ctx};
    use crate::auth::request::SignUpBody;

    async fn register_otp_user(ctx: &AppContext, mailer: &crate::auth::test_support::CaptureMailer) {
        let initiate = SignUpBody {
            name: Some("A".into()),
            email: Some("a@x.com".into()),
            date_of_birth: Some("2000-01-01".into()),
            otp: None,
            password: None,
        };
        handle_sign_up(ctx, initiate.clone()).await.unwrap();
        let code = mailer.last_code().await.unwrap();
        let mut complete = initiate;
        complete.otp = Some(code);
        handle_sign_up(ctx, complete).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let (ctx, _mailer) = otp_ctx();
        let err = handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("ghost@x.com".into()),
                otp: None,
                password: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn otp_round_trip_signs_in() {
        let (ctx, mailer) = otp_ctx();
        register_otp_user(&ctx, &mailer).await;

        handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("a@x.com".into()),
                otp: None,
                password: None,
            },
        )
        .await
        .unwrap();
        let code = mailer.last_code().await.unwrap();

        let outcome = handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("a@x.com".into()),
                otp: Some(code),
                password: None,
            },
        )
        .await
        .unwrap();
        assert!(matches!(outcome, SignInOutcome::SignedIn(_)));
    }

    #[tokio::test]
    async fn wrong_otp_never_issues_token() {
        let (ctx, mailer) = otp_ctx();
        register_otp_user(&ctx, &mailer).await;

        handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("a@x.com".into()),
                otp: None,
                password: None,
            },
        )
        .await
        .unwrap();

        let err = handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("a@x.com".into()),
                otp: Some("000000".into()),
                password: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOtp);
    }

    #[tokio::test]
    async fn password_errors_are_indistinguishable() {
        let (ctx, _mailer) = password_ctx();
        handle_sign_up(
            &ctx,
            SignUpBody {
                name: Some("A".into()),
                email: Some("a@x.com".into()),
                date_of_birth: None,
                otp: None,
                password: Some("hunter22".into()),
            },
        )
        .await
        .unwrap();

        let unknown = handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("ghost@x.com".into()),
                otp: None,
                password: Some("hunter22".into()),
            },
        )
        .await
        .unwrap_err();

        let wrong = handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("a@x.com".into()),
                otp: None,
                password: Some("wrong-password".into()),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(unknown.code, ErrorCode::InvalidCredentials);
        assert_eq!(unknown.message, wrong.message);
        assert_eq!(unknown.status.status_code(), wrong.status.status_code());
    }

    #[tokio::test]
    async fn correct_password_signs_in() {
        let (ctx, _mailer) = password_ctx();
        let registered = handle_sign_up(
            &ctx,
            SignUpBody {
                name: Some("A".into()),
                email: Some("a@x.com".into()),
                date_of_birth: None,
                otp: None,
                password: Some("hunter22".into()),
            },
        )
        .await
        .unwrap();
        assert!(matches!(registered, SignUpOutcome::Created(_)));

        let outcome = handle_sign_in(
            &ctx,
            SignInBody {
                email: Some("a@x.com".into()),
                otp: None,
                password: Some("hunter22".into()),
            },
        )
        .await
        .unwrap();
        match outcome {
            SignInOutcome::SignedIn(success) => assert_eq!(success.user.email, "a@x.com"),
            other => panic!("expected SignedIn, got {other:?}"),
        }
    }
}
