// Auth flows: sign-up, sign-in, the standalone OTP endpoints, session
// introspection, and Google OAuth. Request bodies are validated into tagged
// actions (`request`) before any handler logic runs.

pub mod google;
pub mod otp_routes;
pub mod request;
pub mod session;
pub mod sign_in;
pub mod sign_up;

use std::fmt;

use serde::Serialize;

use notekeep_core::db::{schema, Adapter, StoreResult, User, UserSummary, Where};
use notekeep_core::error::{ApiError, ErrorCode, HttpStatus, NotekeepError};

use crate::crypto::jwt::{sign_token, TokenIdentity};

/// A completed authentication: the user summary plus a fresh bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSuccess {
    pub user: UserSummary,
    pub token: String,
}

/// Sign a bearer token for `user` and bundle it with the client-facing
/// user summary.
pub(crate) fn issue_session(
    user: &User,
    secret: &str,
    ttl_secs: u64,
) -> Result<AuthSuccess, NotekeepError> {
    let token = sign_token(
        &TokenIdentity {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: Some(user.name.clone()),
        },
        secret,
        ttl_secs,
    )?;
    Ok(AuthSuccess {
        user: user.summary(),
        token,
    })
}

pub(crate) async fn find_user_by_email(
    adapter: &dyn Adapter,
    email: &str,
) -> StoreResult<Option<User>> {
    let doc = adapter
        .find_one(
            schema::USERS,
            &[Where::eq("email", email.trim().to_lowercase())],
        )
        .await?;
    doc.map(User::from_doc).transpose()
}

pub(crate) async fn find_user_by_id(
    adapter: &dyn Adapter,
    id: &str,
) -> StoreResult<Option<User>> {
    let doc = adapter
        .find_one(schema::USERS, &[Where::eq("id", id)])
        .await?;
    doc.map(User::from_doc).transpose()
}

/// Collaborator-failure mapper for an operation boundary: logs the real
/// error, returns a generic 500 with the operation's public message.
pub(crate) fn server_error<E: fmt::Display>(message: &'static str) -> impl Fn(E) -> ApiError {
    move |e| {
        tracing::error!(error = %e, "{message}");
        ApiError::with_message(
            HttpStatus::InternalServerError,
            ErrorCode::InternalServerError,
            message,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use notekeep_core::config::{AuthMode, Config, GoogleConfig};
    use notekeep_memory::MemoryAdapter;

    use crate::context::AppContext;
    use crate::mailer::{MailError, Mailer};
    use crate::otp::MemoryChallengeStore;

    /// Records every OTP it is asked to deliver.
    #[derive(Debug, Default)]
    pub struct CaptureMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl CaptureMailer {
        pub async fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().await.clone()
        }

        pub async fn last_code(&self) -> Option<String> {
            self.sent.lock().await.last().map(|(_, code)| code.clone())
        }
    }

    #[async_trait]
    impl Mailer for CaptureMailer {
        async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailError> {
            self.sent
                .lock()
                .await
                .push((email.to_string(), code.to_string()));
            Ok(())
        }
    }

    pub fn test_config(auth_mode: AuthMode) -> Config {
        Config {
            jwt_secret: "test-secret-that-is-long-enough-32".into(),
            mongodb_uri: "mongodb://unused".into(),
            mongodb_db: "notekeep-test".into(),
            port: 0,
            auth_mode,
            frontend_url: "http://localhost:5173".into(),
            google: GoogleConfig {
                client_id: "client-id".into(),
                client_secret: "client-secret".into(),
                redirect_url: "http://localhost:5000/api/auth/callback/google".into(),
            },
            otp_ttl: Duration::from_secs(5 * 60),
        }
    }

    fn ctx_with_mode(auth_mode: AuthMode) -> (AppContext, Arc<CaptureMailer>) {
        let mailer = Arc::new(CaptureMailer::default());
        let ctx = AppContext::new(
            Arc::new(MemoryAdapter::new()),
            Arc::new(MemoryChallengeStore::new()),
            mailer.clone(),
            test_config(auth_mode),
        );
        (ctx, mailer)
    }

    pub fn otp_ctx() -> (AppContext, Arc<CaptureMailer>) {
        ctx_with_mode(AuthMode::EmailOtp)
    }

    pub fn password_ctx() -> (AppContext, Arc<CaptureMailer>) {
        ctx_with_mode(AuthMode::Password)
    }
}
