use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::session::SessionContext;

use super::progress::{ProgressSettings, ProgressTicker};
use super::store::{Attempt, ResultStore, UploadState};
use super::transport::ResumeTransport;
use super::validator::{Rejection, UploadPolicy};
use super::ResumeFile;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("An upload is already in progress")]
    AlreadyUploading,

    #[error(transparent)]
    Rejected(#[from] Rejection),
}

/// The upload workflow for one view.
///
/// Every outcome, including transport failures, lands in the result store;
/// `submit` only reports whether an attempt was started.
pub struct UploadWorkflow {
    store: ResultStore,
    transport: Arc<dyn ResumeTransport>,
    policy: UploadPolicy,
    settings: ProgressSettings,
    // Dropped with the workflow, which aborts any attempt still running.
    attempts: Mutex<JoinSet<()>>,
}

impl UploadWorkflow {
    pub fn new(
        transport: Arc<dyn ResumeTransport>,
        policy: UploadPolicy,
        settings: ProgressSettings,
    ) -> Self {
        Self {
            store: ResultStore::new(),
            transport,
            policy,
            settings,
            attempts: Mutex::new(JoinSet::new()),
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn state(&self) -> UploadState {
        self.store.snapshot()
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validates `file` and, if accepted, starts one upload attempt in the
    /// background. Validation never reaches the transport.
    pub async fn submit(
        &self,
        file: ResumeFile,
        session: &SessionContext,
    ) -> Result<Attempt, UploadError> {
        if self.store.snapshot().is_uploading {
            return Err(UploadError::AlreadyUploading);
        }

        let meta = file.meta();
        debug!(
            "Validating {} ({} bytes, declared {:?})",
            meta.name, meta.size, meta.content_type
        );
        if let Err(rejection) = self.policy.validate(&meta) {
            return Err(self.refuse(rejection));
        }

        let attempt = self.store.start().ok_or(UploadError::AlreadyUploading)?;
        info!("Upload attempt {attempt} for {} accepted", file.name);

        let mut attempts = self.attempts.lock().await;
        while attempts.try_join_next().is_some() {}
        attempts.spawn(run_attempt(
            self.store.clone(),
            self.transport.clone(),
            file,
            session.token().map(String::from),
            attempt,
            self.settings,
        ));

        Ok(attempt)
    }

    /// Records a rejection that happened before upload, e.g. an oversized body.
    pub fn refuse(&self, rejection: Rejection) -> UploadError {
        if !self.store.reject(rejection.to_string()) {
            return UploadError::AlreadyUploading;
        }
        info!("Upload rejected: {rejection}");
        UploadError::Rejected(rejection)
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn dismiss_error(&self) {
        self.store.dismiss_error();
    }
}

async fn run_attempt(
    store: ResultStore,
    transport: Arc<dyn ResumeTransport>,
    file: ResumeFile,
    token: Option<String>,
    attempt: Attempt,
    settings: ProgressSettings,
) {
    let ticker = ProgressTicker::start(store.clone(), attempt, settings);
    let outcome = transport.upload_resume(file, token.as_deref()).await;
    ticker.stop();

    match outcome {
        Ok(result) => {
            info!(
                "Upload attempt {attempt} succeeded: {} ({} words)",
                result.file_name(),
                result.word_count()
            );
            store.succeed(result);
            tokio::time::sleep(settings.settle_delay).await;
            store.settle(attempt);
        }
        Err(e) => {
            warn!("Upload attempt {attempt} failed: {e}");
            store.fail(e.to_string());
        }
    }
}
