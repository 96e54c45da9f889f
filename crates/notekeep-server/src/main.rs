// notekeep API server.
//
// Startup order matters: configuration is validated before anything else so
// a misconfigured deployment dies immediately, then the store connection is
// established and indexes are ensured before the listener opens.

use std::sync::Arc;

use notekeep::mailer::LogMailer;
use notekeep::otp::MemoryChallengeStore;
use notekeep::AppContext;
use notekeep_core::config::Config;
use notekeep_core::db::Adapter;
use notekeep_core::logging::init_logger;
use notekeep_mongodb::MongoAdapter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_logger();

    let adapter = MongoAdapter::connect(&config.mongodb_uri, &config.mongodb_db).await?;
    adapter.ensure_schema().await?;
    tracing::info!(db = %config.mongodb_db, "MongoDB connected");

    let port = config.port;
    let ctx = AppContext::new(
        Arc::new(adapter),
        Arc::new(MemoryChallengeStore::with_ttl(config.otp_ttl)),
        Arc::new(LogMailer),
        config,
    );

    let app = notekeep_axum::router(Arc::new(ctx))?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "notekeep server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
