// Shared application context handed to every handler.

use std::sync::Arc;

use notekeep_core::config::Config;
use notekeep_core::db::Adapter;

use crate::mailer::Mailer;
use crate::otp::ChallengeStore;

/// Everything a request handler needs: the store, the challenge store, the
/// mailer, and the static configuration. All collaborators are injected so
/// tests can swap them out.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub adapter: Arc<dyn Adapter>,
    pub challenges: Arc<dyn ChallengeStore>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(
        adapter: Arc<dyn Adapter>,
        challenges: Arc<dyn ChallengeStore>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        Self {
            adapter,
            challenges,
            mailer,
            config: Arc::new(config),
        }
    }
}
