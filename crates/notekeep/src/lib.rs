// notekeep
//
// Domain logic for the notes backend: the token service, the OTP challenge
// store, the mailer seam, the auth flows (sign-up, sign-in, OTP endpoints,
// session introspection, Google OAuth), and the owner-scoped notes service.
// HTTP wiring lives in `notekeep-axum`; storage backends implement the
// adapter trait from `notekeep-core`.

pub mod auth;
pub mod context;
pub mod crypto;
pub mod mailer;
pub mod notes;
pub mod otp;

pub use context::AppContext;
