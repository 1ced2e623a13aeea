//! Relume application composition root
//!
//! Wires the generation services, the stores, and the domain services
//! into a running session: a seeded ledger, an empty gallery with its
//! expiry sweep, the narration channel, and the restoration flow.

use std::sync::Arc;

use anyhow::Result;
use relume_common::{
    Config, CredentialStore, InMemoryCredentialStore, InMemorySessionStore, SessionStore,
};
use relume_genai::{GenAiConfig, GenAiFactory};
use relume_ledger::{CreditLedger, RewardCenter};
use relume_narration::{NarrationChannel, NullSink};
use relume_restoration::{PollPolicy, RestorationFlow};
use relume_works::{ExpiryScheduler, WorkGallery};

/// A fully wired session
pub struct App {
    pub config: Config,
    pub credentials: Arc<dyn CredentialStore>,
    pub session: Arc<dyn SessionStore>,
    pub ledger: Arc<CreditLedger>,
    pub gallery: Arc<WorkGallery>,
    pub rewards: RewardCenter,
    pub narration: Arc<NarrationChannel>,
    pub flow: Arc<RestorationFlow>,
    scheduler: ExpiryScheduler,
}

impl App {
    /// Wind down background work before the session ends
    pub async fn shutdown(self) {
        self.narration.stop();
        self.scheduler.stop().await;
        tracing::info!("Session shut down");
    }
}

/// Create the application from configuration
pub async fn create_app(config: Config) -> Result<App> {
    let credentials: Arc<dyn CredentialStore> = match &config.gemini_api_key {
        Some(key) => Arc::new(InMemoryCredentialStore::with_key(key.clone())),
        None => Arc::new(InMemoryCredentialStore::new()),
    };
    let session: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let services = GenAiFactory::create(
        GenAiConfig {
            provider: config.genai_provider.clone(),
            base_url: config.gemini_base_url.clone(),
        },
        credentials.clone(),
    )?;

    let ledger = Arc::new(CreditLedger::new(config.initial_energy));
    let gallery = Arc::new(WorkGallery::new());
    let rewards = RewardCenter::new(ledger.clone(), session.clone());

    let narration = Arc::new(NarrationChannel::new(
        services.speech.clone(),
        Arc::new(NullSink::new()),
    ));

    let flow = Arc::new(RestorationFlow::new(
        services,
        credentials.clone(),
        ledger.clone(),
        gallery.clone(),
        narration.clone(),
        PollPolicy::new(config.poll_interval(), config.poll_max_attempts),
    ));

    let scheduler = ExpiryScheduler::start(
        gallery.clone(),
        config.sweep_period(),
        chrono::Duration::seconds(config.retention_hours as i64 * 3600),
    );

    tracing::info!(
        provider = %config.genai_provider,
        energy = config.initial_energy,
        "Application assembled"
    );

    Ok(App {
        config,
        credentials,
        session,
        ledger,
        gallery,
        rewards,
        narration,
        flow,
        scheduler,
    })
}
