//! Push the drafts recorded in the local draft file to the course API.

use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academy_client::config::ClientConfig;
use academy_client::http::HttpBackend;
use academy_client::persistence::JsonFilePersistence;
use academy_client::session::EditorSession;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "academy_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(api_url = %config.api_url, draft_path = %config.draft_path, "Loaded client configuration");

    let backend = HttpBackend::new(&config).expect("Failed to build HTTP client");
    let persistence = JsonFilePersistence::new(&config.draft_path);
    let session = EditorSession::open(backend, persistence)
        .expect("Failed to read draft file")
        .with_idempotent_inserts(config.idempotent_inserts);

    if !session.has_pending() {
        tracing::info!("No pending drafts");
        return ExitCode::SUCCESS;
    }

    match session.save().await {
        Ok(report) if report.is_complete() => {
            tracing::info!(saved = report.saved.len(), "All drafts saved");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for failure in &report.failures {
                tracing::error!(%failure, "Draft not saved");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Save did not run");
            ExitCode::FAILURE
        }
    }
}
