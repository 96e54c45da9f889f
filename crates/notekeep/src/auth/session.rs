// Session introspection. The HTTP layer verifies the bearer token and hands
// the decoded identity here; a token whose subject no longer exists in the
// store is treated exactly like a bad token.

use notekeep_core::db::UserSummary;
use notekeep_core::error::{ApiError, ErrorCode};

use crate::auth::{find_user_by_id, server_error};
use crate::context::AppContext;
use crate::crypto::jwt::TokenIdentity;

pub async fn current_user(
    ctx: &AppContext,
    identity: &TokenIdentity,
) -> Result<UserSummary, ApiError> {
    let user = find_user_by_id(ctx.adapter.as_ref(), &identity.id)
        .await
        .map_err(server_error("Something went wrong!"))?;

    match user {
        Some(user) => Ok(user.summary()),
        None => Err(ApiError::unauthorized(ErrorCode::InvalidToken)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::request::SignUpBody;
    use crate::auth::sign_up::{handle_sign_up, SignUpOutcome};
    use crate::auth::test_support::password_ctx;
    use crate::crypto::jwt::verify_token;

    #[tokio::test]
    async fn resolves_the_token_subject() {
        let (ctx, _mailer) = password_ctx();
        let outcome = handle_sign_up(
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
        let SignUpOutcome::Created(success) = outcome else {
            panic!("expected Created");
        };

        let identity = verify_token(&success.token, &ctx.config.jwt_secret).unwrap();
        let summary = current_user(&ctx, &identity).await.unwrap();
        assert_eq!(summary.email, "a@x.com");
        assert_eq!(summary.id, success.user.id);
    }

    #[tokio::test]
    async fn deleted_subject_reads_as_invalid_token() {
        let (ctx, _mailer) = password_ctx();
        let identity = TokenIdentity {
            id: "no-such-user".into(),
            email: "ghost@x.com".into(),
            display_name: None,
        };
        let err = current_user(&ctx, &identity).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }
}
