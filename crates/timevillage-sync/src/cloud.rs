//! Push / pull between the session and the remote document

use crate::document::UserDocument;
use crate::error::{Error, Result};
use crate::identity::IdentityProvider;
use crate::remote::RemoteStore;
use chrono::Utc;
use std::sync::Arc;
use timevillage_session::Session;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const TARGET: &str = "timevillage::sync";

/// What a pull did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// No remote document existed; the local state was pushed instead
    Seeded,
    /// Local balances and buildings were replaced
    Replaced { buildings: usize },
}

/// Cloud reconciliation for one session
///
/// Owns no state beyond its collaborators: it reads the session, writes the
/// remote document, and the other way round.
pub struct CloudSync<R, I> {
    session: Arc<Session>,
    remote: Arc<R>,
    identity: Arc<I>,
}

impl<R, I> Clone for CloudSync<R, I> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            remote: self.remote.clone(),
            identity: self.identity.clone(),
        }
    }
}

impl<R, I> CloudSync<R, I>
where
    R: RemoteStore + 'static,
    I: IdentityProvider + 'static,
{
    pub fn new(session: Arc<Session>, remote: Arc<R>, identity: Arc<I>) -> Self {
        Self {
            session,
            remote,
            identity,
        }
    }

    /// Whether an identity is available to sync under
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_signed_in()
    }

    fn user_id(&self) -> Result<String> {
        self.identity.user_id().ok_or(Error::NotSignedIn)
    }

    /// Overwrite the remote document with the local state
    pub async fn push(&self) -> Result<UserDocument> {
        let user_id = self.user_id()?;
        let state = self.session.state()?;
        let document = UserDocument::from_state(&state, Utc::now());
        self.remote.store(&user_id, &document).await?;

        tracing::info!(
            target: TARGET,
            user = %user_id,
            buildings = document.buildings.len(),
            balance = document.accumulated_time,
            "Pushed village"
        );
        Ok(document)
    }

    /// Replace the local state with the remote document
    ///
    /// Seeds the remote document from local state when none exists. Local
    /// changes that were never pushed are lost.
    pub async fn pull(&self) -> Result<PullOutcome> {
        let user_id = self.user_id()?;
        let Some(document) = self.remote.fetch(&user_id).await? else {
            tracing::info!(target: TARGET, user = %user_id, "No remote village; seeding");
            self.push().await?;
            return Ok(PullOutcome::Seeded);
        };

        let state = self.session.replace_from_remote(
            document.accumulated_time,
            document.global_time,
            document.building_rows(),
        )?;
        tracing::info!(
            target: TARGET,
            user = %user_id,
            buildings = state.buildings.len(),
            synced_at = %document.last_sync_timestamp,
            "Pulled village"
        );
        Ok(PullOutcome::Replaced {
            buildings: state.buildings.len(),
        })
    }

    /// Push in the background; failures are logged, not retried
    pub fn spawn_push(&self) -> JoinHandle<()> {
        let sync = self.clone();
        tokio::spawn(async move {
            if let Err(err) = sync.push().await {
                log_failure("push", &err);
            }
        })
    }

    /// Pull in the background; failures are logged, not retried
    pub fn spawn_pull(&self) -> JoinHandle<()> {
        let sync = self.clone();
        tokio::spawn(async move {
            if let Err(err) = sync.pull().await {
                log_failure("pull", &err);
            }
        })
    }

    /// Push after every village change
    ///
    /// Changes that arrive while a push is in flight are coalesced into one
    /// follow-up push. The task runs until [`AutoPush::finish`] is called or
    /// the handle is dropped; pending changes are pushed before it stops.
    pub fn spawn_autopush(&self) -> AutoPush {
        let sync = self.clone();
        let mut changes = self.session.subscribe_village();
        // the first value is the state at subscription time
        changes.try_recv();
        let (stop, mut stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    change = changes.recv() => {
                        if change.is_none() {
                            break;
                        }
                        changes.latest();
                        sync.push_if_signed_in().await;
                    }
                    _ = &mut stopped => {
                        if changes.latest().is_some() {
                            sync.push_if_signed_in().await;
                        }
                        break;
                    }
                }
            }
        });
        AutoPush { stop, task }
    }

    async fn push_if_signed_in(&self) {
        if !self.is_signed_in() {
            tracing::debug!(target: TARGET, "Signed out; skipping push");
            return;
        }
        if let Err(err) = self.push().await {
            log_failure("push", &err);
        }
    }
}

/// Handle to a running auto-push task
pub struct AutoPush {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl AutoPush {
    /// Push whatever changed since the last push, then stop
    pub async fn finish(self) {
        // the task may already be gone
        let _ = self.stop.send(());
        let _ = self.task.await;
    }

    /// Stop at once, dropping pending changes
    pub fn abort(self) {
        self.task.abort();
    }
}

fn log_failure(operation: &str, err: &Error) {
    tracing::warn!(target: TARGET, operation, error = %err, "Cloud sync failed");
}
