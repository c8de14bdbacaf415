//! Session lifecycle controller.
//!
//! Owns the [`ChatStore`] and drives one polling task per active session.
//! Each session's poller is bound to a [`CancellationToken`] that is
//! cancelled at exactly one point: the terminal transition (or an explicit
//! abandon), under the same store lock that records that transition.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ars_client::ResearchTransport;
use ars_config::PollingConfig;
use ars_core::entities::{ChatMessage, Customization, ResearchState};
use ars_core::responses::ResearchRequest;
use tokio::sync::{RwLock, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::progress::ThinkingView;
use crate::store::{Applied, ChatStore, SessionPhase};

struct Shared {
    store: ChatStore,
    /// Cancellation handles of sessions that are still polling, by message id.
    pollers: HashMap<String, CancellationToken>,
}

struct Inner<T> {
    transport: T,
    poll_interval: Duration,
    shared: RwLock<Shared>,
    revision: watch::Sender<u64>,
}

/// Cloneable handle to the controller; clones share state.
pub struct SessionController<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SessionController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A submitted session that is (or was) polling.
pub struct ActiveSession<T> {
    pub user_message_id: String,
    pub message_id: String,
    pub research_id: String,
    token: CancellationToken,
    controller: SessionController<T>,
}

impl<T> fmt::Debug for ActiveSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("user_message_id", &self.user_message_id)
            .field("message_id", &self.message_id)
            .field("research_id", &self.research_id)
            .field("finished", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T: ResearchTransport + 'static> ActiveSession<T> {
    /// Wait until the session leaves `Polling` and return its final phase.
    pub async fn wait(&self) -> SessionPhase {
        self.token.cancelled().await;
        self.controller.phase(&self.message_id).await
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop polling this session.
    ///
    /// # Errors
    ///
    /// Propagates [`SessionController::abandon`] errors.
    pub async fn abandon(&self) -> Result<(), SessionError> {
        self.controller.abandon(&self.message_id).await
    }
}

impl<T: ResearchTransport + 'static> SessionController<T> {
    /// A zero `poll_interval` is raised to one millisecond.
    #[must_use]
    pub fn new(transport: T, poll_interval: Duration) -> Self {
        let poll_interval = poll_interval.max(Duration::from_millis(1));
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                transport,
                poll_interval,
                shared: RwLock::new(Shared {
                    store: ChatStore::new(),
                    pollers: HashMap::new(),
                }),
                revision,
            }),
        }
    }

    #[must_use]
    pub fn from_config(transport: T, polling: &PollingConfig) -> Self {
        Self::new(transport, polling.interval())
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Receiver that changes every time the store is mutated.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Submit `topic` and start polling for it.
    ///
    /// The user message and the assistant placeholder are in the thread
    /// before the submission request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyTopic`] for a blank topic, or
    /// [`SessionError::Submission`] if the backend refused or was
    /// unreachable; the placeholder then carries the failure text.
    pub async fn start_research(
        &self,
        topic: &str,
        customization: Customization,
    ) -> Result<ActiveSession<T>, SessionError> {
        self.start(topic, customization, false).await
    }

    /// Like [`start_research`](Self::start_research), but refuses while any
    /// request is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while loading, otherwise the same
    /// errors as `start_research`.
    pub async fn try_start_research(
        &self,
        topic: &str,
        customization: Customization,
    ) -> Result<ActiveSession<T>, SessionError> {
        self.start(topic, customization, true).await
    }

    async fn start(
        &self,
        topic: &str,
        customization: Customization,
        exclusive: bool,
    ) -> Result<ActiveSession<T>, SessionError> {
        let (user_message_id, message_id) = {
            let mut shared = self.inner.shared.write().await;
            if exclusive {
                shared.store.try_begin_submission(topic)?
            } else {
                shared.store.begin_submission(topic)?
            }
        };
        self.notify();

        let request = ResearchRequest::new(topic, customization);
        let started = match self.inner.transport.submit_research(&request).await {
            Ok(started) => started,
            Err(source) => {
                tracing::warn!(%message_id, error = %source, "research submission failed");
                {
                    let mut shared = self.inner.shared.write().await;
                    shared
                        .store
                        .fail_submission(&message_id, &source.to_string())?;
                }
                self.notify();
                return Err(SessionError::Submission { message_id, source });
            }
        };

        let research_id = started.research_id;
        let token = CancellationToken::new();
        {
            let mut shared = self.inner.shared.write().await;
            match shared
                .store
                .attach_research_id(&message_id, research_id.clone())?
            {
                Applied::Ignored => {
                    tracing::debug!(%message_id, %research_id, "session abandoned before it started");
                    token.cancel();
                }
                _ => {
                    shared.pollers.insert(message_id.clone(), token.clone());
                    self.spawn_poller(message_id.clone(), research_id.clone(), token.clone());
                    tracing::info!(%message_id, %research_id, "research session polling");
                }
            }
        }
        self.notify();

        Ok(ActiveSession {
            user_message_id,
            message_id,
            research_id,
            token,
            controller: self.clone(),
        })
    }

    /// Stop polling the session tracked by `message_id`.
    ///
    /// Abandoning a finished session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMessage`] if no session exists for it.
    pub async fn abandon(&self, message_id: &str) -> Result<(), SessionError> {
        let applied = {
            let mut shared = self.inner.shared.write().await;
            let applied = shared.store.abandon(message_id)?;
            if let Some(token) = shared.pollers.remove(message_id) {
                token.cancel();
            }
            applied
        };
        if applied != Applied::Ignored {
            tracing::info!(%message_id, "research session abandoned");
            self.notify();
        }
        Ok(())
    }

    /// Abandon every session that is still outstanding.
    pub async fn shutdown(&self) {
        let abandoned = {
            let mut shared = self.inner.shared.write().await;
            let ids = shared.store.active_message_ids();
            for id in &ids {
                if let Err(error) = shared.store.abandon(id) {
                    tracing::warn!(message_id = %id, %error, "failed to abandon session");
                }
            }
            for (_, token) in shared.pollers.drain() {
                token.cancel();
            }
            ids.len()
        };
        if abandoned > 0 {
            tracing::debug!(abandoned, "controller shut down");
            self.notify();
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Snapshot of the whole thread, in order.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.inner.shared.read().await.store.messages().to_vec()
    }

    pub async fn message(&self, message_id: &str) -> Option<ChatMessage> {
        self.inner
            .shared
            .read()
            .await
            .store
            .message(message_id)
            .cloned()
    }

    pub async fn last_assistant(&self) -> Option<ChatMessage> {
        self.inner
            .shared
            .read()
            .await
            .store
            .last_assistant()
            .cloned()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.shared.read().await.store.is_loading()
    }

    pub async fn phase(&self, message_id: &str) -> SessionPhase {
        self.inner.shared.read().await.store.phase(message_id)
    }

    /// Progress view for the session tracked by `message_id`.
    pub async fn thinking_view(&self, message_id: &str) -> Option<ThinkingView> {
        let shared = self.inner.shared.read().await;
        let message = shared.store.message(message_id)?;
        let terminal = shared.store.phase(message_id).is_resolved();
        Some(ThinkingView::derive(
            message.research_state.as_ref(),
            terminal,
        ))
    }

    /// Number of sessions with a live poller.
    pub async fn active_pollers(&self) -> usize {
        self.inner.shared.read().await.pollers.len()
    }

    // ── Polling ────────────────────────────────────────────────────

    fn notify(&self) {
        self.inner.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Tick every `poll_interval`, first tick one interval from now. Each
    /// tick's fetch runs as its own task so a slow fetch never delays the
    /// next tick.
    fn spawn_poller(&self, message_id: String, research_id: String, token: CancellationToken) {
        let controller = self.clone();
        tokio::spawn(async move {
            let period = controller.inner.poll_interval;
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let controller = controller.clone();
                        let message_id = message_id.clone();
                        let research_id = research_id.clone();
                        let token = token.clone();
                        tokio::spawn(async move {
                            controller.poll_once(&message_id, &research_id, &token).await;
                        });
                    }
                }
            }
            tracing::debug!(%message_id, %research_id, "poller stopped");
        });
    }

    async fn poll_once(&self, message_id: &str, research_id: &str, token: &CancellationToken) {
        let fetched = tokio::select! {
            biased;
            () = token.cancelled() => return,
            fetched = self.inner.transport.fetch_research_state(research_id) => fetched,
        };

        match fetched {
            Ok(state) => self.apply_snapshot(message_id, research_id, state, token).await,
            Err(error) => {
                tracing::warn!(%research_id, %error, "failed to fetch research state; retrying next tick");
            }
        }
    }

    async fn apply_snapshot(
        &self,
        message_id: &str,
        research_id: &str,
        state: ResearchState,
        token: &CancellationToken,
    ) {
        let applied = {
            let mut shared = self.inner.shared.write().await;
            if token.is_cancelled() {
                return;
            }
            let status = state.status;
            let applied = match shared.store.apply_snapshot(message_id, state) {
                Ok(applied) => applied,
                Err(error) => {
                    tracing::warn!(%message_id, %research_id, %error, "snapshot rejected");
                    return;
                }
            };
            if let Applied::Finalized(phase) = applied {
                shared.pollers.remove(message_id);
                token.cancel();
                tracing::info!(%message_id, %research_id, %phase, %status, "research session finished");
            }
            applied
        };

        if applied != Applied::Ignored {
            self.notify();
        }
    }
}
