//! Session synchronization use case.
//!
//! This module provides the `SyncCoordinator`, which orchestrates the
//! canonical `SessionStore`, the persistent snapshot cache, and the remote
//! conversation store. All user-facing session operations flow through it:
//! it applies mutations optimistically, confirms or corrects them against
//! the remote store, and writes a cache snapshot after every mutation.
//!
//! # Concurrency
//!
//! The store sits behind a `RwLock` and is mutated only through the
//! coordinator, so writes are serialized. No lock is held across a network
//! await: each async operation captures the ids it targets, releases the
//! lock, suspends, then re-validates before applying its result. A result
//! whose target session disappeared while the call was in flight is
//! dropped, never applied.

use rtichat_core::cache::SnapshotStore;
use rtichat_core::error::{ChatError, Result};
use rtichat_core::remote::RemoteConversationClient;
use rtichat_core::session::{AttachmentRef, Message, Session, SessionStore, derive_title};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, watch};

/// Orchestrates session state across the in-memory store, the local
/// snapshot cache, and the authoritative remote store.
///
/// # Responsibilities
///
/// - Restoring cached state at startup and reconciling it in the background
/// - Applying user mutations optimistically and confirming them remotely
/// - Confirming provisional sessions (id remap) on their first round-trip
/// - Keeping ephemeral sessions out of every persistence path
/// - Writing a cache snapshot after every store mutation
pub struct SyncCoordinator {
    /// Canonical session state; mutated only through this coordinator.
    store: RwLock<SessionStore>,
    /// Local persistent cache, written fire-and-forget.
    cache: Arc<dyn SnapshotStore>,
    /// Authoritative remote conversation store.
    remote: Arc<dyn RemoteConversationClient>,
    /// In-flight guard: concurrent reconciliations are coalesced, not queued.
    reconcile_in_flight: AtomicBool,
    /// Sessions deleted locally while a reconciliation was in flight; those
    /// remote entries are skipped for that merge only.
    tombstones: Mutex<HashSet<String>>,
}

impl SyncCoordinator {
    /// Creates a coordinator over the given cache and remote client.
    pub fn new(cache: Arc<dyn SnapshotStore>, remote: Arc<dyn RemoteConversationClient>) -> Self {
        Self {
            store: RwLock::new(SessionStore::new()),
            cache,
            remote,
            reconcile_in_flight: AtomicBool::new(false),
            tombstones: Mutex::new(HashSet::new()),
        }
    }

    /// Builds a coordinator wired to the on-disk cache and the configured
    /// backend endpoint.
    pub fn from_default_environment() -> Result<Arc<Self>> {
        let cache = rtichat_infrastructure::FileSnapshotStore::default_location()
            .map_err(ChatError::from)?;
        let remote = rtichat_remote::HttpConversationClient::from_config_file()?;
        Ok(Arc::new(Self::new(Arc::new(cache), Arc::new(remote))))
    }

    // ============================================================================
    // Read access for the UI layer
    // ============================================================================

    /// The session list in display order.
    pub async fn sessions(&self) -> Vec<Session> {
        self.store.read().await.sessions().to_vec()
    }

    /// Id of the active session, if any.
    pub async fn active_id(&self) -> Option<String> {
        self.store.read().await.active_id().map(str::to_string)
    }

    /// The currently active session, resolving the ephemeral slot first.
    pub async fn active_session(&self) -> Option<Session> {
        self.store.read().await.active_session().cloned()
    }

    /// Subscribes to change notifications (a revision counter bumped on
    /// every store mutation).
    pub async fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.read().await.subscribe()
    }

    // ============================================================================
    // Startup
    // ============================================================================

    /// Restores the cached snapshot for immediate display, then launches a
    /// background reconciliation without blocking the caller.
    pub async fn restore(self: &Arc<Self>) {
        let snapshot = self.cache.load().await;
        {
            let mut store = self.store.write().await;
            store.apply_snapshot(snapshot);
        }

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            coordinator.reconcile().await;
        });
    }

    /// Fetches the remote session list and merges it into local state.
    ///
    /// Best-effort: failures are logged and swallowed, local state stays
    /// untouched. A reconciliation already in flight suppresses this one
    /// rather than queuing it.
    pub async fn reconcile(&self) {
        if self.reconcile_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("Reconciliation already in flight, skipping");
            return;
        }

        match self.remote.list().await {
            Ok(remote_sessions) => {
                let tombstones = {
                    let mut tombstones = self.tombstones.lock().await;
                    std::mem::take(&mut *tombstones)
                };
                {
                    let mut store = self.store.write().await;
                    store.merge_remote(&remote_sessions, &tombstones);
                }
                self.persist().await;
                tracing::debug!(
                    count = remote_sessions.len(),
                    "Reconciled remote session list"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Background reconciliation failed");
            }
        }

        self.reconcile_in_flight.store(false, Ordering::SeqCst);
    }

    // ============================================================================
    // User operations
    // ============================================================================

    /// Starts a fresh "new chat" session and makes it active.
    ///
    /// An active ephemeral session is deactivated first, discarding its
    /// messages; any existing provisional session is replaced.
    pub async fn new_chat(&self) {
        {
            let mut store = self.store.write().await;
            if store.ephemeral_active() {
                store.deactivate_ephemeral();
            }
            store.replace_provisional(Session::new_provisional());
        }
        self.persist().await;
    }

    /// Enters ephemeral mode: a transient session that never touches the
    /// cache or the persisted session list.
    ///
    /// The previously active non-ephemeral state is suspended in place. A
    /// no-op if ephemeral mode is already active.
    pub async fn activate_ephemeral(&self) {
        let mut store = self.store.write().await;
        if store.ephemeral_active() {
            return;
        }
        store.activate_ephemeral(Session::new_ephemeral());
    }

    /// Makes the session with `id` active, lazily fetching its message
    /// history when needed.
    ///
    /// Unknown ids are a silent no-op. Selecting a normal session while
    /// ephemeral mode is active leaves ephemeral mode and discards its
    /// messages. History is fetched only for a persisted session whose
    /// buffer is still empty; provisional sessions have nothing to fetch.
    pub async fn select_session(&self, id: &str) {
        let needs_fetch = {
            let mut store = self.store.write().await;
            let Some(session) = store.session(id) else {
                return;
            };
            let target_is_ephemeral = session.is_ephemeral();
            let needs_fetch = session.is_persisted() && session.messages.is_empty();

            if store.ephemeral_active() && !target_is_ephemeral {
                store.deactivate_ephemeral();
            }
            store.set_active(id);
            needs_fetch
        };
        self.persist().await;

        if !needs_fetch {
            return;
        }

        match self.remote.get_messages(id).await {
            Ok(history) => {
                let applied = {
                    let mut store = self.store.write().await;
                    match store.session(id) {
                        // The user may have deleted the session while the
                        // fetch was in flight; the result must not
                        // resurrect it.
                        None => {
                            tracing::debug!(
                                session = %id,
                                "Discarding history for a session that no longer exists"
                            );
                            false
                        }
                        // A message sent meanwhile owns the buffer now.
                        Some(session) if !session.messages.is_empty() => false,
                        Some(_) => {
                            let messages = history
                                .iter()
                                .map(|m| Message::from_remote(m.sender, &m.text, &m.created_at))
                                .collect();
                            store.set_messages(id, messages).is_ok()
                        }
                    }
                };
                if applied {
                    self.persist().await;
                }
            }
            Err(e) => {
                tracing::warn!(session = %id, error = %e, "Failed to fetch message history");
            }
        }
    }

    /// Sends a message in the active session.
    ///
    /// The user message is appended optimistically and never rolled back. A
    /// provisional session derives its title from its first message and is
    /// confirmed (id remap, lifecycle transition) by the send's response.
    /// Remote failures surface as an inline error notice, not as an `Err`;
    /// only local state errors propagate.
    pub async fn send_message(
        &self,
        text: impl Into<String>,
        attachment: Option<AttachmentRef>,
    ) -> Result<()> {
        let text = text.into();

        let (target_id, is_ephemeral, was_provisional) = {
            let mut store = self.store.write().await;
            if store.active_session().is_none() {
                store.replace_provisional(Session::new_provisional());
            }
            let session = store
                .active_session()
                .ok_or_else(|| ChatError::internal("No active session"))?;
            let target_id = session.id.clone();
            let is_ephemeral = session.is_ephemeral();
            let was_provisional = session.is_provisional();
            let is_first = session.messages.is_empty();

            store.append_message(&target_id, Message::user(text.clone(), attachment.clone()))?;
            if was_provisional && is_first {
                store.set_title(&target_id, derive_title(&text))?;
            }
            (target_id, is_ephemeral, was_provisional)
        };
        if !is_ephemeral {
            self.persist().await;
        }

        // Provisional and ephemeral sessions have no remote id yet; the
        // backend creates (or ignores) a conversation for them.
        let remote_id = (!was_provisional && !is_ephemeral).then_some(target_id.as_str());

        match self.remote.send(remote_id, &text, attachment.as_ref()).await {
            Ok(outcome) => {
                let applied = {
                    let mut store = self.store.write().await;
                    if store.session(&target_id).is_none() {
                        tracing::debug!(
                            session = %target_id,
                            "Discarding send result for a session that no longer exists"
                        );
                        false
                    } else {
                        let final_id = if !is_ephemeral && outcome.session_id != target_id {
                            store.remap_id(&target_id, &outcome.session_id);
                            outcome.session_id.clone()
                        } else {
                            target_id.clone()
                        };
                        if let Err(e) = store
                            .append_message(&final_id, Message::assistant(outcome.assistant_text))
                        {
                            tracing::warn!(session = %final_id, error = %e, "Failed to append reply");
                        }
                        true
                    }
                };
                if applied && !is_ephemeral {
                    self.persist().await;
                }
                Ok(())
            }
            Err(e) if e.is_remote_failure() => {
                tracing::warn!(session = %target_id, error = %e, "Message send failed");
                let applied = {
                    let mut store = self.store.write().await;
                    if store.session(&target_id).is_none() {
                        false
                    } else {
                        store
                            .append_message(
                                &target_id,
                                Message::error_notice(format!(
                                    "Something went wrong while sending your message: {e}"
                                )),
                            )
                            .is_ok()
                    }
                };
                if applied && !is_ephemeral {
                    self.persist().await;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes a session, remote first.
    ///
    /// Deleting the provisional "new chat" session is rejected before any
    /// I/O. A remote failure propagates and the session stays listed; only
    /// a confirmed remote delete removes it locally.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        {
            let store = self.store.read().await;
            let session = store
                .session(id)
                .ok_or_else(|| ChatError::invalid_operation(format!("unknown session: {id}")))?;
            if session.is_provisional() {
                return Err(ChatError::invalid_operation(
                    "the current new-chat session cannot be deleted",
                ));
            }
            if session.is_ephemeral() {
                return Err(ChatError::invalid_operation(
                    "ephemeral sessions are not tracked remotely",
                ));
            }
        }

        self.remote.delete(id).await?;

        // A merge computed from a list fetched before this delete must not
        // bring the session back.
        if self.reconcile_in_flight.load(Ordering::SeqCst) {
            self.tombstones.lock().await.insert(id.to_string());
        }

        {
            let mut store = self.store.write().await;
            store.remove_session(id);
        }
        self.persist().await;
        Ok(())
    }

    /// Replaces the text of an assistant message in place.
    pub async fn edit_assistant_message(
        &self,
        session_id: &str,
        message_id: &str,
        text: impl Into<String>,
    ) -> Result<()> {
        let is_ephemeral = {
            let mut store = self.store.write().await;
            store.edit_assistant_message(session_id, message_id, text.into())?;
            store
                .session(session_id)
                .map(|s| s.is_ephemeral())
                .unwrap_or(false)
        };
        if !is_ephemeral {
            self.persist().await;
        }
        Ok(())
    }

    // ============================================================================
    // Internals
    // ============================================================================

    /// Writes the current state to the snapshot cache.
    ///
    /// Skipped entirely while ephemeral mode is active: nothing typed in an
    /// ephemeral session may reach the cache, not even the surrounding
    /// session list.
    async fn persist(&self) {
        let snapshot = {
            let store = self.store.read().await;
            if store.ephemeral_active() {
                return;
            }
            store.snapshot()
        };
        self.cache.save(&snapshot).await;
    }
}
