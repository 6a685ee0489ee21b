use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::progress::ProgressSettings;
use super::transport::ResumeTransport;
use super::validator::UploadPolicy;
use super::workflow::UploadWorkflow;

/// Views untouched for this long are dropped unless an upload is in flight.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    workflow: Arc<UploadWorkflow>,
    last_seen: Instant,
}

/// Upload workflows keyed by the id of the view that mounted them.
///
/// No state is shared between entries; removing an entry drops its
/// workflow, which aborts any attempt and timer it still owns.
#[derive(Clone)]
pub struct UploadSessions {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    transport: Arc<dyn ResumeTransport>,
    policy: UploadPolicy,
    settings: ProgressSettings,
    idle_ttl: Duration,
}

impl UploadSessions {
    pub fn new(
        transport: Arc<dyn ResumeTransport>,
        policy: UploadPolicy,
        settings: ProgressSettings,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            transport,
            policy,
            settings,
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub async fn mount(&self) -> (Uuid, Arc<UploadWorkflow>) {
        self.evict_idle().await;

        let id = Uuid::new_v4();
        let workflow = Arc::new(UploadWorkflow::new(
            self.transport.clone(),
            self.policy.clone(),
            self.settings,
        ));
        self.sessions.write().await.insert(
            id,
            Entry {
                workflow: workflow.clone(),
                last_seen: Instant::now(),
            },
        );
        info!("Upload view {id} mounted");
        (id, workflow)
    }

    /// Looks up a view and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Option<Arc<UploadWorkflow>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.workflow.clone())
    }

    /// Returns false when the view was never mounted or is already gone.
    pub async fn unmount(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        if removed.is_some() {
            info!("Upload view {id} unmounted");
        }
        removed.is_some()
    }

    /// Drops views idle for longer than the TTL. Views with an upload in
    /// flight are kept. Returns how many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.workflow.state().is_uploading
                || now.duration_since(entry.last_seen) < self.idle_ttl;
            if !keep {
                debug!("Evicting idle upload view {id}");
            }
            keep
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle upload views");
        }
        evicted
    }

    /// Runs `evict_idle` every `every` until the handle is aborted.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(every);
            loop {
                ticks.tick().await;
                sessions.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::time::sleep;

    use super::*;
    use crate::session::SessionContext;
    use crate::test_support::{sample_upload_result, MockTransport};
    use crate::upload::ResumeFile;

    fn sessions() -> UploadSessions {
        sessions_with(MockTransport::succeeding(sample_upload_result(1, 1)))
    }

    fn sessions_with(transport: MockTransport) -> UploadSessions {
        UploadSessions::new(
            Arc::new(transport),
            UploadPolicy::default(),
            ProgressSettings::default(),
        )
        .with_idle_ttl(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_mount_and_get() {
        let sessions = sessions();
        let (id, workflow) = sessions.mount().await;
        let found = sessions.get(id).await.unwrap();
        assert!(Arc::ptr_eq(&workflow, &found));
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_views_do_not_share_state() {
        let sessions = sessions();
        let (_, a) = sessions.mount().await;
        let (_, b) = sessions.mount().await;
        a.store().reject("only a");
        assert!(b.state().error.is_none());
    }

    #[tokio::test]
    async fn test_unmount_removes_once() {
        let sessions = sessions();
        let (id, _) = sessions.mount().await;
        assert!(sessions.unmount(id).await);
        assert!(!sessions.unmount(id).await);
        assert!(sessions.get(id).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_views_evicted_on_mount() {
        let sessions = sessions();
        for _ in 0..1000 {
            sessions.mount().await;
        }
        assert_eq!(sessions.len().await, 1000);

        sleep(Duration::from_secs(61)).await;
        let (fresh, _) = sessions.mount().await;

        assert_eq!(sessions.len().await, 1);
        assert!(sessions.get(fresh).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recently_used_view_survives() {
        let sessions = sessions();
        let (kept, _) = sessions.mount().await;
        let (dropped, _) = sessions.mount().await;

        sleep(Duration::from_secs(40)).await;
        sessions.get(kept).await.unwrap();
        sleep(Duration::from_secs(30)).await;

        assert_eq!(sessions.evict_idle().await, 1);
        assert!(sessions.get(kept).await.is_some());
        assert!(sessions.get(dropped).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uploading_view_is_not_evicted() {
        let sessions = sessions_with(
            MockTransport::succeeding(sample_upload_result(1, 1))
                .with_delay(Duration::from_secs(600)),
        );
        let (id, workflow) = sessions.mount().await;
        workflow
            .submit(
                ResumeFile::new("a.pdf", None, Bytes::from_static(b"%PDF")),
                &SessionContext::anonymous(),
            )
            .await
            .unwrap();
        drop(workflow);

        sleep(Duration::from_secs(120)).await;
        assert_eq!(sessions.evict_idle().await, 0);
        assert!(sessions.get(id).await.unwrap().state().is_uploading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_without_traffic() {
        let sessions = sessions();
        sessions.mount().await;
        let sweeper = sessions.spawn_sweeper(Duration::from_secs(10));

        sleep(Duration::from_secs(90)).await;
        assert_eq!(sessions.len().await, 0);
        sweeper.abort();
    }
}
