// notekeep-core
//
// Foundation crate for the notekeep backend: error taxonomy, environment
// configuration, the document-store adapter abstraction, typed data models,
// id generation, and logger bootstrap.

pub mod config;
pub mod db;
pub mod error;
pub mod id;
pub mod logging;

pub use config::{AuthMode, Config, ConfigError, GoogleConfig};
pub use error::{ApiError, ErrorCode, HttpStatus, NotekeepError};
