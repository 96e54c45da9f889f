// Error taxonomy for the notekeep API.
//
// Every user-facing failure is an `ApiError` carrying an HTTP status, a
// stable error code, and the message shown to the client. Internal failures
// (configuration, store, crypto, mail) are `NotekeepError` and are mapped to
// a generic 500 at the operation boundary so no internal detail leaks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable error codes for every user-facing failure.
///
/// The `Display` impl is the exact message sent to clients. The 401 messages
/// are deliberately undifferentiated (bad token vs. expired token, unknown
/// email vs. wrong password) so responses cannot be used for account
/// enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingSignupFields,
    MissingPasswordSignupFields,
    MissingSigninFields,
    MissingSigninEmail,
    MissingEmail,
    UserAlreadyExists,
    UserNotFound,
    InvalidOtp,
    InvalidCredentials,
    NoToken,
    InvalidToken,
    NoteRequired,
    NoteNotFound,
    OauthFailed,
    RouteNotFound,
    InternalServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingSignupFields => "Please provide name, email, and date of birth",
            Self::MissingPasswordSignupFields => "Please provide name, email, and password",
            Self::MissingSigninFields => "Please provide email and password",
            Self::MissingSigninEmail => "Please provide email",
            Self::MissingEmail => "Email is required",
            Self::UserAlreadyExists => "User already exists with this email",
            Self::UserNotFound => "User not found",
            Self::InvalidOtp => "Invalid or expired OTP",
            Self::InvalidCredentials => "Invalid email or password",
            Self::NoToken => "No token, authorization denied",
            Self::InvalidToken => "Token is not valid",
            Self::NoteRequired => "Note is required",
            Self::NoteNotFound => "Note not found",
            Self::OauthFailed => "Google sign-in failed",
            Self::RouteNotFound => "Route not found",
            Self::InternalServerError => "Something went wrong!",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status codes used by the API error system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Ok = 200,
    Created = 201,
    Found = 302,
    BadRequest = 400,
    Unauthorized = 401,
    NotFound = 404,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// A user-facing API error: HTTP status, stable code, client message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {code:?}: {message}")]
pub struct ApiError {
    pub status: HttpStatus,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: HttpStatus, code: ErrorCode) -> Self {
        Self {
            message: code.to_string(),
            status,
            code,
        }
    }

    /// Override the default message for this code.
    pub fn with_message(status: HttpStatus, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(HttpStatus::BadRequest, code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Unauthorized, code)
    }

    pub fn not_found(code: ErrorCode) -> Self {
        Self::new(HttpStatus::NotFound, code)
    }

    pub fn internal(code: ErrorCode) -> Self {
        Self::new(HttpStatus::InternalServerError, code)
    }

    /// The `{success: false, message}` body every error response carries.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "message": self.message,
        })
    }
}

/// Internal (non-HTTP) error. Configuration problems, store failures, crypto
/// failures, and mail dispatch failures end up here; the HTTP layer turns
/// them into a generic 500 after logging.
#[derive(Debug, thiserror::Error)]
pub enum NotekeepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Unified result type for notekeep operations.
pub type Result<T> = std::result::Result<T, NotekeepError>;
