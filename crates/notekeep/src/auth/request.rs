// Tagged auth request variants.
//
// The wire bodies for sign-up and sign-in are bags of optional fields: the
// presence of `otp` distinguishes "start the flow" from "complete it", and
// password-mode deployments carry `password` instead. Rather than branching
// on field presence inside the handlers, each body is validated here into
// an explicit action for the deployment's auth mode, and missing-field
// errors are produced before any handler logic runs.

use serde::Deserialize;

use notekeep_core::config::AuthMode;
use notekeep_core::error::{ApiError, ErrorCode};

/// Treat absent and blank as the same thing.
pub(crate) fn non_empty(v: Option<String>) -> Option<String> {
    v.and_then(|s| {
        let t = s.trim().to_string();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    })
}

// ─── Sign-up ─────────────────────────────────────────────────────

/// Raw sign-up body as received on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpBody {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// The profile fields required to register in OTP mode.
#[derive(Debug, Clone)]
pub struct SignupProfile {
    pub name: String,
    pub email: String,
    pub date_of_birth: String,
}

/// A validated sign-up request.
#[derive(Debug)]
pub enum SignUpAction {
    /// OTP mode, no code yet: challenge the email.
    Initiate(SignupProfile),
    /// OTP mode with a code: verify and create the user.
    Complete { profile: SignupProfile, otp: String },
    /// Password mode: create the user with a hashed password.
    Password {
        name: String,
        email: String,
        password: String,
    },
}

impl SignUpBody {
    pub fn into_action(self, mode: AuthMode) -> Result<SignUpAction, ApiError> {
        match mode {
            AuthMode::Password => {
                let name = non_empty(self.name);
                let email = non_empty(self.email);
                let password = non_empty(self.password);
                match (name, email, password) {
                    (Some(name), Some(email), Some(password)) => Ok(SignUpAction::Password {
                        name,
                        email,
                        password,
                    }),
                    _ => Err(ApiError::bad_request(ErrorCode::MissingPasswordSignupFields)),
                }
            }
            AuthMode::EmailOtp => {
                let name = non_empty(self.name);
                let email = non_empty(self.email);
                let date_of_birth = non_empty(self.date_of_birth);
                let (Some(name), Some(email), Some(date_of_birth)) = (name, email, date_of_birth)
                else {
                    return Err(ApiError::bad_request(ErrorCode::MissingSignupFields));
                };
                let profile = SignupProfile {
                    name,
                    email,
                    date_of_birth,
                };
                match non_empty(self.otp) {
                    Some(otp) => Ok(SignUpAction::Complete { profile, otp }),
                    None => Ok(SignUpAction::Initiate(profile)),
                }
            }
        }
    }
}

// ─── Sign-in ─────────────────────────────────────────────────────

/// Raw sign-in body as received on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A validated sign-in request.
#[derive(Debug)]
pub enum SignInAction {
    /// OTP mode, no code yet: challenge the email.
    Initiate { email: String },
    /// OTP mode with a code: verify and issue a token.
    Complete { email: String, otp: String },
    /// Password mode.
    Password { email: String, password: String },
}

impl SignInBody {
    pub fn into_action(self, mode: AuthMode) -> Result<SignInAction, ApiError> {
        match mode {
            AuthMode::Password => {
                let email = non_empty(self.email);
                let password = non_empty(self.password);
                match (email, password) {
                    (Some(email), Some(password)) => {
                        Ok(SignInAction::Password { email, password })
                    }
                    _ => Err(ApiError::bad_request(ErrorCode::MissingSigninFields)),
                }
            }
            AuthMode::EmailOtp => {
                let Some(email) = non_empty(self.email) else {
                    return Err(ApiError::bad_request(ErrorCode::MissingSigninEmail));
                };
                match non_empty(self.otp) {
                    Some(otp) => Ok(SignInAction::Complete { email, otp }),
                    None => Ok(SignInAction::Initiate { email }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(
        name: Option<&str>,
        email: Option<&str>,
        dob: Option<&str>,
        otp: Option<&str>,
    ) -> SignUpBody {
        SignUpBody {
            name: name.map(String::from),
            email: email.map(String::from),
            date_of_birth: dob.map(String::from),
            otp: otp.map(String::from),
            password: None,
        }
    }

    #[test]
    fn signup_without_otp_is_initiate() {
        let action = body(Some("A"), Some("a@x.com"), Some("2000-01-01"), None)
            .into_action(AuthMode::EmailOtp)
            .unwrap();
        assert!(matches!(action, SignUpAction::Initiate(_)));
    }

    #[test]
    fn signup_with_otp_is_complete() {
        let action = body(Some("A"), Some("a@x.com"), Some("2000-01-01"), Some("123456"))
            .into_action(AuthMode::EmailOtp)
            .unwrap();
        match action {
            SignUpAction::Complete { profile, otp } => {
                assert_eq!(profile.email, "a@x.com");
                assert_eq!(otp, "123456");
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn signup_missing_fields_rejected() {
        let err = body(Some("A"), None, Some("2000-01-01"), None)
            .into_action(AuthMode::EmailOtp)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSignupFields);
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let err = body(Some("  "), Some("a@x.com"), Some("2000-01-01"), None)
            .into_action(AuthMode::EmailOtp)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSignupFields);
    }

    #[test]
    fn password_mode_ignores_otp_field() {
        let mut b = body(Some("A"), Some("a@x.com"), None, Some("123456"));
        b.password = Some("hunter22".into());
        let action = b.into_action(AuthMode::Password).unwrap();
        assert!(matches!(action, SignUpAction::Password { .. }));
    }

    #[test]
    fn password_mode_requires_password() {
        let err = body(Some("A"), Some("a@x.com"), None, None)
            .into_action(AuthMode::Password)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingPasswordSignupFields);
    }

    #[test]
    fn signin_requires_email() {
        let err = SignInBody::default()
            .into_action(AuthMode::EmailOtp)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSigninEmail);
        assert_eq!(err.message, "Please provide email");
    }

    #[test]
    fn signin_with_otp_is_complete() {
        let action = SignInBody {
            email: Some("a@x.com".into()),
            otp: Some("654321".into()),
            password: None,
        }
        .into_action(AuthMode::EmailOtp)
        .unwrap();
        assert!(matches!(action, SignInAction::Complete { .. }));
    }
}
