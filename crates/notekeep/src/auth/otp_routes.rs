// Standalone OTP endpoints: send, resend, verify. These operate on the
// challenge store directly and do not require a registered account, so a
// client can prove control of an address before or independently of the
// sign-up and sign-in flows.

use notekeep_core::error::{ApiError, ErrorCode, HttpStatus};

use crate::auth::server_error;
use crate::auth::request::non_empty;
use crate::context::AppContext;
use crate::otp::generate_otp;

const RESEND_OTP_FAILED: &str = "Server error while resending OTP";

pub async fn handle_send_otp(ctx: &AppContext, email: Option<String>) -> Result<(), ApiError> {
    issue_and_send(ctx, email, "Something went wrong!").await
}

pub async fn handle_resend_otp(ctx: &AppContext, email: Option<String>) -> Result<(), ApiError> {
    issue_and_send(ctx, email, RESEND_OTP_FAILED).await
}

async fn issue_and_send(
    ctx: &AppContext,
    email: Option<String>,
    failure_message: &'static str,
) -> Result<(), ApiError> {
    let email = non_empty(email).ok_or_else(|| ApiError::bad_request(ErrorCode::MissingEmail))?;
    let email = email.to_lowercase();

    let code = generate_otp();
    ctx.challenges.issue(&email, code.clone()).await;

    ctx.mailer
        .send_otp(&email, &code)
        .await
        .map_err(server_error(failure_message))?;

    Ok(())
}

/// Consume a pending challenge without touching any user record. A missing
/// email or code fails the same way a wrong code does.
pub async fn handle_verify_otp(
    ctx: &AppContext,
    email: Option<String>,
    otp: Option<String>,
) -> Result<(), ApiError> {
    let (Some(email), Some(otp)) = (non_empty(email), non_empty(otp)) else {
        return Err(invalid_otp());
    };

    let email = email.to_lowercase();
    if !ctx.challenges.verify(&email, &otp).await {
        return Err(invalid_otp());
    }

    Ok(())
}

fn invalid_otp() -> ApiError {
    ApiError::with_message(HttpStatus::BadRequest, ErrorCode::InvalidOtp, "Invalid OTP")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::otp_ctx;

    #[tokio::test]
    async fn send_requires_email() {
        let (ctx, mailer) = otp_ctx();
        let err = handle_send_otp(&ctx, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingEmail);
        assert!(mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn send_then_verify_consumes_the_code() {
        let (ctx, mailer) = otp_ctx();
        handle_send_otp(&ctx, Some("a@x.com".into())).await.unwrap();
        let code = mailer.last_code().await.unwrap();

        handle_verify_otp(&ctx, Some("a@x.com".into()), Some(code.clone()))
            .await
            .unwrap();

        // Consumed on first use.
        let err = handle_verify_otp(&ctx, Some("a@x.com".into()), Some(code))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid OTP");
    }

    #[tokio::test]
    async fn resend_invalidates_the_previous_code() {
        let (ctx, mailer) = otp_ctx();
        handle_send_otp(&ctx, Some("a@x.com".into())).await.unwrap();
        let first = mailer.last_code().await.unwrap();

        handle_resend_otp(&ctx, Some("a@x.com".into())).await.unwrap();
        let second = mailer.last_code().await.unwrap();

        if first != second {
            let err = handle_verify_otp(&ctx, Some("a@x.com".into()), Some(first))
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidOtp);
        }
        handle_verify_otp(&ctx, Some("a@x.com".into()), Some(second))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn email_is_matched_case_insensitively() {
        let (ctx, mailer) = otp_ctx();
        handle_send_otp(&ctx, Some("A@X.com".into())).await.unwrap();
        let code = mailer.last_code().await.unwrap();
        handle_verify_otp(&ctx, Some("a@x.com".into()), Some(code))
            .await
            .unwrap();
    }
}
