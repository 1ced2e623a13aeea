// Relume - Local demo session

use tokio::signal;
use tracing::{error, info, warn};

use relume_common::Config;
use relume_restoration::{RestorationMode, SourceImage, SubmitOutcome};

// 1x1 grayscale PNG, stands in for an uploaded photograph
const SAMPLE_IMAGE_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAAAAAA6fptVAAAACklEQVR4nGNiAAAABgADNjd8qAAAAABJRU5ErkJggg==";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .pretty()
        .init();

    info!("Starting Relume local demo session");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let app = relume_app::create_app(config).await.map_err(|e| {
        error!("Failed to assemble application: {}", e);
        e
    })?;

    info!(energy = app.ledger.balance(), "Session ready");

    let today = chrono::Utc::now().date_naive();
    if app.rewards.check_in(today) {
        info!(energy = app.ledger.balance(), "Daily check-in rewarded");
    }

    let flow = app.flow.clone();
    let source = SourceImage::new(SAMPLE_IMAGE_BASE64, "image/png");
    match flow.submit(source, RestorationMode::Photo).await {
        Ok(SubmitOutcome::Completed(item)) => {
            info!(id = %item.id, title = %item.title, "Restoration committed to the gallery");
        }
        Ok(SubmitOutcome::CredentialRequired) => {
            warn!("No API key configured; set GEMINI_API_KEY and restart to run the demo job");
        }
        Ok(SubmitOutcome::Discarded) => {}
        Err(e) => {
            warn!(error = %e, energy = app.ledger.balance(), "Restoration failed; cost refunded");
        }
    }

    info!(
        works = app.gallery.len(),
        energy = app.ledger.balance(),
        "Demo complete; press Ctrl+C to end the session"
    );

    shutdown_signal().await;
    app.shutdown().await;

    info!("Session ended");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, winding down");
        },
        _ = terminate => {
            info!("Received terminate signal, winding down");
        },
    }
}
