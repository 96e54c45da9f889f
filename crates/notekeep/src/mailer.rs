// Mailer seam.
//
// Email delivery is an external transport: the auth flows only need "send
// this code to this address". Deployments wire in whatever transport they
// use; `LogMailer` is the development implementation that writes the code
// to the log instead of sending anything.

use std::fmt;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error("mail dispatch failed: {0}")]
pub struct MailError(pub String);

#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    /// Deliver a one-time passcode to `email`.
    async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailError>;
}

/// Logs the code instead of sending it. Development only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, email: &str, code: &str) -> Result<(), MailError> {
        tracing::info!(email, code, "OTP issued (LogMailer, not delivered)");
        Ok(())
    }
}
