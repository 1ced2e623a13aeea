//! Restoration flow orchestration
//!
//! Drives a submission end to end: credential check, optimistic credit
//! debit, the remote generation call (single shot for photos, polled
//! long-running operation for videos), then the success fan-out into the
//! gallery and the narration channel, or the failure path with its
//! unconditional refund.
//!
//! Every remote failure is classified at this boundary; nothing from the
//! generation layer propagates past the flow. Closing the flow abandons
//! in-flight work: a completion whose epoch no longer matches refunds the
//! debit but commits nothing else.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use relume_common::{CredentialStore, Error, Result};
use relume_genai::{GenAiError, GenAiServices, RestoreRequest, VideoRequest};
use relume_ledger::CreditLedger;
use relume_narration::NarrationChannel;
use relume_works::{WorkGallery, WorkItem};

use crate::domain::entities::{PendingSubmission, RestorationMode, SourceImage};
use crate::domain::state::{JobEvent, JobState, JobStateMachine};

/// Instructions sent with every photo restoration request
pub const RESTORE_INSTRUCTIONS: &str = "Restore this old photograph: repair scratches, tears and \
    fading, then colorize it naturally while keeping every face true to the original. Alongside \
    the image, write one or two warm sentences, as if the moment in the photo were speaking to \
    the person holding it today.";

/// Prompt sent with every image-to-video request
pub const VIDEO_PROMPT: &str = "Bring this restored photograph gently to life: subtle, natural \
    motion, a soft smile or a slight turn, as if the moment were breathing again. Keep the \
    framing and every face faithful to the original.";

/// Narration spoken when the model returns no commentary of its own
pub const DEFAULT_NARRATION: &str = "This memory has travelled a long way to meet you again. \
    May it bring back the warmth of that day.";

/// How often a long-running video operation is polled, and for how long
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: std::time::Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: std::time::Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        // 10s polls, 15 minutes of budget
        Self {
            interval: std::time::Duration::from_secs(10),
            max_attempts: 90,
        }
    }
}

/// Callback surfaced at each visible step of a running job
pub type ProgressFn = Arc<dyn Fn(&str) + Send + Sync>;

/// How a submission resolved
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The job succeeded and this work was committed to the gallery
    Completed(WorkItem),
    /// A credential is needed; the submission is parked and resumes
    /// automatically once one is supplied
    CredentialRequired,
    /// The flow was closed while the job was in flight; the debit was
    /// refunded and nothing was committed
    Discarded,
}

/// The restoration orchestrator.
///
/// All ledger and gallery mutations for a job funnel through here, so the
/// debit/refund pairing and the single-writer contract on both stores hold
/// as long as callers drive one job at a time.
pub struct RestorationFlow {
    services: GenAiServices,
    credentials: Arc<dyn CredentialStore>,
    ledger: Arc<CreditLedger>,
    gallery: Arc<WorkGallery>,
    narration: Arc<NarrationChannel>,
    poll: PollPolicy,
    progress: Option<ProgressFn>,
    phase: Mutex<JobState>,
    pending: Mutex<Option<PendingSubmission>>,
    epoch: AtomicU64,
}

impl RestorationFlow {
    pub fn new(
        services: GenAiServices,
        credentials: Arc<dyn CredentialStore>,
        ledger: Arc<CreditLedger>,
        gallery: Arc<WorkGallery>,
        narration: Arc<NarrationChannel>,
        poll: PollPolicy,
    ) -> Self {
        Self {
            services,
            credentials,
            ledger,
            gallery,
            narration,
            poll,
            progress: None,
            phase: Mutex::new(JobState::Idle),
            pending: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Attach a progress callback invoked at each visible job step
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Current job phase
    pub fn phase(&self) -> JobState {
        *self.phase.lock().unwrap()
    }

    /// The submission parked while waiting for a credential, if any
    pub fn pending(&self) -> Option<PendingSubmission> {
        self.pending.lock().unwrap().clone()
    }

    /// Submit a source image for restoration.
    ///
    /// With no credential configured the submission is parked and
    /// `CredentialRequired` is returned; otherwise the job runs to
    /// completion. An insufficient balance is rejected before any remote
    /// call and creates no job.
    pub async fn submit(&self, source: SourceImage, mode: RestorationMode) -> Result<SubmitOutcome> {
        // A new submission discards whatever the previous job left behind
        *self.phase.lock().unwrap() = JobState::Idle;

        if self.credentials.get().is_none() {
            tracing::info!(%mode, "No credential configured; parking submission");
            self.park(source, mode, JobEvent::CredentialMissing)?;
            return Ok(SubmitOutcome::CredentialRequired);
        }

        self.start(source, mode, JobEvent::Submit).await
    }

    /// Store a credential and resume the parked submission, if any.
    ///
    /// Returns `None` when nothing was parked.
    pub async fn supply_credential(&self, key: impl Into<String>) -> Result<Option<SubmitOutcome>> {
        self.credentials.set(key.into());

        let parked = self.pending.lock().unwrap().take();
        let Some(PendingSubmission { source, mode }) = parked else {
            return Ok(None);
        };

        tracing::info!(%mode, "Credential supplied; resuming parked submission");
        match self.start(source.clone(), mode, JobEvent::CredentialSupplied).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) => {
                // Keep the submission parked so a later credential or
                // top-up can replay it
                if matches!(err, Error::InsufficientCredit { .. }) {
                    *self.pending.lock().unwrap() = Some(PendingSubmission { source, mode });
                }
                Err(err)
            }
        }
    }

    /// Close the flow: abandon in-flight work, drop the parked submission,
    /// and silence the narration channel. In-flight completions observe the
    /// epoch change, refund their debit, and commit nothing.
    pub fn close(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.pending.lock().unwrap() = None;
        *self.phase.lock().unwrap() = JobState::Idle;
        self.narration.stop();
        tracing::debug!("Restoration flow closed");
    }

    fn park(&self, source: SourceImage, mode: RestorationMode, event: JobEvent) -> Result<()> {
        self.transition(event)?;
        *self.pending.lock().unwrap() = Some(PendingSubmission { source, mode });
        Ok(())
    }

    fn transition(&self, event: JobEvent) -> Result<()> {
        let mut phase = self.phase.lock().unwrap();
        let next = JobStateMachine::transition(*phase, event.clone())
            .map_err(|e| Error::Internal(e.to_string()))?;
        tracing::debug!(from = %*phase, %event, to = %next, "Job transition");
        *phase = next;
        Ok(())
    }

    fn report(&self, message: &str) {
        if let Some(progress) = &self.progress {
            progress(message);
        }
    }

    async fn start(
        &self,
        source: SourceImage,
        mode: RestorationMode,
        event: JobEvent,
    ) -> Result<SubmitOutcome> {
        let cost = mode.cost();
        if !self.ledger.consume(cost) {
            // Rejected before any remote call; no job exists to fail
            return Err(Error::InsufficientCredit {
                required: cost,
                available: self.ledger.balance(),
            });
        }

        self.transition(event)?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let result = match mode {
            RestorationMode::Photo => self.run_photo(&source).await,
            RestorationMode::Video => self.run_video(&source).await,
        };
        let stale = self.epoch.load(Ordering::SeqCst) != epoch;

        match result {
            Ok((locator, narration)) => {
                if stale {
                    // The flow was closed mid-job; the work is not wanted
                    tracing::info!(%mode, "Discarding stale completion");
                    self.ledger.grant(cost);
                    return Ok(SubmitOutcome::Discarded);
                }

                let created_at = Utc::now();
                let title = format!(
                    "{} {}",
                    mode.work_title(),
                    created_at.format("%Y-%m-%d %H:%M")
                );
                let item = WorkItem::new(mode.work_kind(), title, locator, created_at);
                self.gallery.insert(item.clone())?;
                self.transition(JobEvent::Success)?;

                let text = narration.unwrap_or_else(|| DEFAULT_NARRATION.to_string());
                self.narration.speak(text);

                tracing::info!(%mode, id = %item.id, "Restoration succeeded");
                Ok(SubmitOutcome::Completed(item))
            }
            Err(err) => {
                // Refund is unconditional on any non-success path
                self.ledger.grant(cost);

                if stale {
                    tracing::info!(%mode, "Discarding stale failure");
                    return Ok(SubmitOutcome::Discarded);
                }

                if err.is_credential() {
                    tracing::warn!(%mode, error = %err, "Credential rejected; clearing it");
                    self.credentials.clear();
                    self.park(source, mode, JobEvent::CredentialRejected)?;
                    return Ok(SubmitOutcome::CredentialRequired);
                }

                tracing::warn!(%mode, error = %err, "Restoration failed");
                self.transition(JobEvent::Failure)?;
                Err(err)
            }
        }
    }

    async fn run_photo(&self, source: &SourceImage) -> Result<(String, Option<String>)> {
        self.report("Restoring your photograph...");

        let outcome = self
            .services
            .restorer
            .restore(RestoreRequest {
                image_base64: source.base64.clone(),
                mime_type: source.mime_type.clone(),
                instructions: RESTORE_INSTRUCTIONS.to_string(),
            })
            .await
            .map_err(classify)?;

        let image = outcome.image.ok_or_else(|| {
            Error::EmptyResult("restoration response carried no image".to_string())
        })?;

        Ok((image.to_data_url(), outcome.narration))
    }

    async fn run_video(&self, source: &SourceImage) -> Result<(String, Option<String>)> {
        self.report("Preparing the moment...");

        let handle = self
            .services
            .video
            .start(VideoRequest {
                image_base64: source.base64.clone(),
                mime_type: source.mime_type.clone(),
                prompt: VIDEO_PROMPT.to_string(),
            })
            .await
            .map_err(classify)?;

        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;
            self.report(&format!("Weaving the moment into motion ({attempt})..."));

            let status = self.services.video.poll(&handle).await.map_err(classify)?;
            if status.done {
                let locator = status.result_uri.ok_or_else(|| {
                    Error::EmptyResult("operation finished without a result locator".to_string())
                })?;
                let bytes = self.services.video.fetch(&locator).await.map_err(classify)?;
                return Ok((format!("data:video/mp4;base64,{}", STANDARD.encode(bytes)), None));
            }
        }

        Err(Error::Timeout(format!(
            "video generation still pending after {} polls",
            self.poll.max_attempts
        )))
    }
}

/// Classify a generation-layer failure into the common taxonomy
fn classify(err: GenAiError) -> Error {
    match err {
        GenAiError::InvalidKey(message) => Error::CredentialInvalid(message),
        GenAiError::RateLimit => Error::Service("rate limit exceeded".to_string()),
        GenAiError::Request(message) | GenAiError::Response(message) => Error::Service(message),
        GenAiError::Configuration(message) => Error::Internal(message),
    }
}
