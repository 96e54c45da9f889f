// Token service: HS256 sign/verify using the `jsonwebtoken` crate.
//
// Tokens are stateless; validity is entirely signature + expiry at verify
// time. Callers must not distinguish why verification failed: `verify_token`
// collapses bad signature, malformed token, and expiry into `None`, and the
// HTTP layer answers all of them with the same "Token is not valid".

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use notekeep_core::error::NotekeepError;

/// Token lifetime for password and OTP sign-ins: 7 days.
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Token lifetime for OAuth sign-ins: 1 hour.
pub const OAUTH_TTL_SECS: u64 = 60 * 60;

/// The identity a token carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenIdentity {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Internal claims wrapper: the identity plus standard `iat`/`exp`.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    identity: TokenIdentity,
    iat: u64,
    exp: u64,
}

/// Sign a bearer token for `identity`, valid for `ttl_secs`.
///
/// Fails only if serialization or signing fails, which is a
/// configuration-class error, not a per-request one.
pub fn sign_token(
    identity: &TokenIdentity,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, NotekeepError> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = TokenClaims {
        identity: identity.clone(),
        iat: now,
        exp: now + ttl_secs,
    };

    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| NotekeepError::Crypto(format!("token signing failed: {e}")))
}

/// Verify a bearer token and decode its identity.
///
/// Returns `None` for any failure: bad signature, malformed token, expiry.
pub fn verify_token(token: &str, secret: &str) -> Option<TokenIdentity> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<TokenClaims>(token, &key, &validation).ok()?;
    Some(data.claims.identity)
}
