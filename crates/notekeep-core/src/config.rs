// Environment configuration.
//
// Every required variable is read once at startup; a missing or malformed
// value is a fatal `ConfigError`, never a runtime error. `.env` loading is
// the binary's job (dotenvy) so library code and tests stay hermetic.

use std::time::Duration;

/// Which sign-in flow this deployment runs. The two flows are mutually
/// exclusive per deployment; OAuth sign-in is available in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Passwordless: email one-time-passcode challenge/response.
    EmailOtp,
    /// Classic email + password.
    Password,
}

impl AuthMode {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "otp" | "email-otp" => Some(Self::EmailOtp),
            "password" => Some(Self::Password),
            _ => None,
        }
    }
}

/// Google OAuth client settings.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// The callback URL registered with Google, e.g.
    /// `https://api.example.com/api/auth/callback/google`.
    pub redirect_url: String,
}

/// Runtime configuration for the notekeep server.
#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub port: u16,
    pub auth_mode: AuthMode,
    /// Frontend origin: CORS allow-origin and OAuth redirect target.
    pub frontend_url: String,
    pub google: GoogleConfig,
    /// How long a one-time passcode stays valid.
    pub otp_ttl: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

impl Config {
    /// Read the full configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_raw = require("PORT")?;
        let port = port_raw
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?;

        let auth_mode = match std::env::var("AUTH_MODE") {
            Ok(raw) => {
                AuthMode::parse(&raw).ok_or_else(|| ConfigError::Invalid("AUTH_MODE", raw))?
            }
            Err(_) => AuthMode::EmailOtp,
        };

        Ok(Self {
            jwt_secret: require("JWT_SECRET")?,
            mongodb_uri: require("MONGODB_URI")?,
            mongodb_db: std::env::var("MONGODB_DB").unwrap_or_else(|_| "notekeep".to_string()),
            port,
            auth_mode,
            frontend_url: require("FRONTEND_URL")?,
            google: GoogleConfig {
                client_id: require("GOOGLE_CLIENT_ID")?,
                client_secret: require("GOOGLE_CLIENT_SECRET")?,
                redirect_url: require("GOOGLE_REDIRECT_URL")?,
            },
            otp_ttl: Duration::from_secs(5 * 60),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mode_parsing() {
        assert_eq!(AuthMode::parse("otp"), Some(AuthMode::EmailOtp));
        assert_eq!(AuthMode::parse("email-otp"), Some(AuthMode::EmailOtp));
        assert_eq!(AuthMode::parse("PASSWORD"), Some(AuthMode::Password));
        assert_eq!(AuthMode::parse("magic-link"), None);
    }

    #[test]
    fn missing_variable_names_the_key() {
        let err = ConfigError::Missing("JWT_SECRET");
        assert_eq!(err.to_string(), "Environment variable JWT_SECRET is not set");
    }
}
