//! Chat thread state and its reducer.
//!
//! [`ChatStore`] is the single mutable application state: the ordered
//! message thread, the per-session lifecycle phase, and the shared
//! "a request is outstanding" flag. It is mutated only through
//! [`ChatStore::apply`] (or the typed methods it dispatches to), which keeps
//! every lifecycle transition testable without a transport or a runtime.
//!
//! ```text
//! Idle → Submitting → Polling → Complete
//!            │           └────→ Error
//!            └──────────────────→ Error      (submission failed)
//! Submitting | Polling ─────────→ Abandoned  (navigated away)
//! ```

use std::collections::HashMap;
use std::fmt;

use ars_core::entities::{ChatMessage, ResearchState};
use ars_core::enums::ResearchStatus;
use ars_core::errors::CoreError;
use ars_core::ids::{PREFIX_MESSAGE, generate_id};

use crate::error::SessionError;

/// Content of a finalized message whose snapshot carries no synthesized text.
pub const COMPLETION_NOTICE: &str = "Research complete.";

/// Content of a message abandoned before any report arrived.
pub const ABANDONED_NOTICE: &str = "Research abandoned.";

/// Lifecycle phase of one research session, tracked per assistant message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Complete,
    Error,
    Abandoned,
}

impl SessionPhase {
    /// Terminal phases never transition again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Abandoned)
    }

    /// The backend reported an outcome. Abandoned sessions never got one.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Polling => "polling",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation request against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    BeginSubmission {
        topic: String,
    },
    AttachResearchId {
        message_id: String,
        research_id: String,
    },
    SubmissionFailed {
        message_id: String,
        reason: String,
    },
    ApplySnapshot {
        message_id: String,
        state: ResearchState,
    },
    Abandon {
        message_id: String,
    },
}

/// What an applied action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// User message and assistant placeholder were appended.
    Submitted {
        user_message_id: String,
        assistant_message_id: String,
    },
    /// The session id is now attached and the session is polling.
    Attached,
    /// The session failed to start.
    Failed,
    /// A non-terminal snapshot replaced the previous one.
    Updated,
    /// This action moved the session into the given terminal phase.
    Finalized(SessionPhase),
    /// The session was already terminal; nothing changed.
    Ignored,
}

#[derive(Debug, Default)]
pub struct ChatStore {
    messages: Vec<ChatMessage>,
    phases: HashMap<String, SessionPhase>,
    is_loading: bool,
}

impl ChatStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyTopic`] for a blank topic,
    /// [`SessionError::UnknownMessage`] if the target message does not exist,
    /// and [`SessionError::Core`] for a transition the lifecycle forbids.
    pub fn apply(&mut self, action: StoreAction) -> Result<Applied, SessionError> {
        match action {
            StoreAction::BeginSubmission { topic } => {
                let (user_message_id, assistant_message_id) = self.begin_submission(&topic)?;
                Ok(Applied::Submitted {
                    user_message_id,
                    assistant_message_id,
                })
            }
            StoreAction::AttachResearchId {
                message_id,
                research_id,
            } => self.attach_research_id(&message_id, research_id),
            StoreAction::SubmissionFailed { message_id, reason } => {
                self.fail_submission(&message_id, &reason)
            }
            StoreAction::ApplySnapshot { message_id, state } => {
                self.apply_snapshot(&message_id, state)
            }
            StoreAction::Abandon { message_id } => self.abandon(&message_id),
        }
    }

    /// Append the user message and the assistant placeholder in one step and
    /// raise the loading flag. Returns `(user_id, assistant_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyTopic`] if `topic` is blank, or
    /// [`SessionError::Core`] if an id cannot be generated. On error the
    /// thread is unchanged.
    pub fn begin_submission(&mut self, topic: &str) -> Result<(String, String), SessionError> {
        self.begin_submission_with(topic, || generate_id(PREFIX_MESSAGE))
    }

    /// [`begin_submission`](Self::begin_submission) that refuses while a
    /// request is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while loading, otherwise the same
    /// errors as `begin_submission`.
    pub fn try_begin_submission(&mut self, topic: &str) -> Result<(String, String), SessionError> {
        if self.is_loading {
            return Err(SessionError::Busy);
        }
        self.begin_submission(topic)
    }

    fn begin_submission_with(
        &mut self,
        topic: &str,
        mut generate: impl FnMut() -> Result<String, CoreError>,
    ) -> Result<(String, String), SessionError> {
        if topic.trim().is_empty() {
            return Err(SessionError::EmptyTopic);
        }

        let user_id = self.fresh_id(&mut generate, None)?;
        let assistant_id = self.fresh_id(&mut generate, Some(&user_id))?;

        self.messages.push(ChatMessage::user(user_id.clone(), topic));
        self.messages
            .push(ChatMessage::assistant_placeholder(assistant_id.clone()));
        self.phases
            .insert(assistant_id.clone(), SessionPhase::Submitting);
        self.is_loading = true;

        tracing::debug!(%user_id, %assistant_id, "submission started");
        Ok((user_id, assistant_id))
    }

    /// Attach the backend session id to a submitting placeholder.
    ///
    /// Re-attaching the same id is a no-op; a different id is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMessage`] or [`SessionError::Core`] on
    /// an invalid transition.
    pub fn attach_research_id(
        &mut self,
        message_id: &str,
        research_id: String,
    ) -> Result<Applied, SessionError> {
        let phase = self.phase_of(message_id)?;
        let message = self.message_mut(message_id)?;

        if let Some(existing) = &message.research_id {
            if *existing == research_id {
                return Ok(Applied::Attached);
            }
            return Err(invalid_transition(
                message_id,
                &format!("research id {existing}"),
                &format!("research id {research_id}"),
            ));
        }

        match phase {
            SessionPhase::Submitting => {
                message.research_id = Some(research_id);
                self.phases
                    .insert(message_id.to_owned(), SessionPhase::Polling);
                Ok(Applied::Attached)
            }
            SessionPhase::Abandoned => Ok(Applied::Ignored),
            other => Err(invalid_transition(
                message_id,
                other.as_str(),
                SessionPhase::Polling.as_str(),
            )),
        }
    }

    /// Finalize a placeholder whose submission failed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMessage`] or [`SessionError::Core`] on
    /// an invalid transition.
    pub fn fail_submission(
        &mut self,
        message_id: &str,
        reason: &str,
    ) -> Result<Applied, SessionError> {
        match self.phase_of(message_id)? {
            SessionPhase::Submitting => {}
            SessionPhase::Abandoned => return Ok(Applied::Ignored),
            other => {
                return Err(invalid_transition(
                    message_id,
                    other.as_str(),
                    SessionPhase::Error.as_str(),
                ));
            }
        }

        let message = self.message_mut(message_id)?;
        message.content = format!("Error starting research: {reason}");
        message.is_thinking = false;
        self.phases
            .insert(message_id.to_owned(), SessionPhase::Error);
        self.is_loading = false;
        Ok(Applied::Failed)
    }

    /// Replace the message's snapshot and citations with `state`.
    ///
    /// A snapshot whose status is `complete`/`error`, or which carries a
    /// non-empty HTML report, finalizes the session. Snapshots arriving after
    /// that are [`Applied::Ignored`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMessage`] or [`SessionError::Core`] if
    /// the session is not polling yet.
    pub fn apply_snapshot(
        &mut self,
        message_id: &str,
        state: ResearchState,
    ) -> Result<Applied, SessionError> {
        match self.phase_of(message_id)? {
            SessionPhase::Polling => {}
            phase if phase.is_terminal() => return Ok(Applied::Ignored),
            other => {
                return Err(invalid_transition(
                    message_id,
                    other.as_str(),
                    SessionPhase::Polling.as_str(),
                ));
            }
        }

        let finished = state.is_finished();
        let terminal_phase = if state.status == ResearchStatus::Error {
            SessionPhase::Error
        } else {
            SessionPhase::Complete
        };

        let message = self.message_mut(message_id)?;
        message.sources = state.citations();
        if finished {
            message.content = state
                .synthesized_text()
                .unwrap_or(COMPLETION_NOTICE)
                .to_owned();
            message.is_thinking = false;
        }
        message.research_state = Some(state);

        if !finished {
            return Ok(Applied::Updated);
        }

        self.phases.insert(message_id.to_owned(), terminal_phase);
        self.is_loading = false;
        Ok(Applied::Finalized(terminal_phase))
    }

    /// Stop tracking a session that has not finished.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownMessage`] if no session exists for
    /// `message_id`.
    pub fn abandon(&mut self, message_id: &str) -> Result<Applied, SessionError> {
        if self.phase_of(message_id)?.is_terminal() {
            return Ok(Applied::Ignored);
        }

        let message = self.message_mut(message_id)?;
        message.is_thinking = false;
        if message.content.is_empty() {
            message.content = ABANDONED_NOTICE.to_owned();
        }
        self.phases
            .insert(message_id.to_owned(), SessionPhase::Abandoned);
        self.is_loading = false;
        Ok(Applied::Finalized(SessionPhase::Abandoned))
    }

    // ── Queries ────────────────────────────────────────────────────

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn message(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Phase of the session tracked by `message_id`. User messages and
    /// unknown ids are `Idle`.
    #[must_use]
    pub fn phase(&self, message_id: &str) -> SessionPhase {
        self.phases.get(message_id).copied().unwrap_or_default()
    }

    /// Most recent assistant message, if any.
    #[must_use]
    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Ids of assistant messages whose session has not finished.
    #[must_use]
    pub fn active_message_ids(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| !self.phase(&m.id).is_terminal() && self.phases.contains_key(&m.id))
            .map(|m| m.id.clone())
            .collect()
    }

    // ── Internals ──────────────────────────────────────────────────

    fn phase_of(&self, message_id: &str) -> Result<SessionPhase, SessionError> {
        self.phases
            .get(message_id)
            .copied()
            .ok_or_else(|| SessionError::UnknownMessage(message_id.to_owned()))
    }

    fn message_mut(&mut self, message_id: &str) -> Result<&mut ChatMessage, SessionError> {
        self.messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| SessionError::UnknownMessage(message_id.to_owned()))
    }

    /// Random ids can collide; retry until unique within this thread and
    /// distinct from `reserved`.
    fn fresh_id(
        &self,
        generate: &mut impl FnMut() -> Result<String, CoreError>,
        reserved: Option<&str>,
    ) -> Result<String, SessionError> {
        loop {
            let id = generate()?;
            if reserved != Some(id.as_str()) && self.message(&id).is_none() {
                return Ok(id);
            }
        }
    }
}

fn invalid_transition(message_id: &str, from: &str, to: &str) -> SessionError {
    SessionError::Core(CoreError::InvalidTransition {
        entity_type: "research session".into(),
        id: message_id.to_owned(),
        from: from.to_owned(),
        to: to.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use ars_core::entities::Finding;
    use ars_core::enums::MessageRole;
    use ars_core::ids::has_prefix_format;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn finding(source: &str) -> Finding {
        Finding {
            source: source.into(),
            ..Default::default()
        }
    }

    fn polling_store() -> (ChatStore, String) {
        let mut store = ChatStore::new();
        let (_, assistant) = store.begin_submission("Market Analysis of EVs 2025").unwrap();
        store
            .apply(StoreAction::AttachResearchId {
                message_id: assistant.clone(),
                research_id: "abc123".into(),
            })
            .unwrap();
        (store, assistant)
    }

    #[test]
    fn begin_submission_appends_user_then_placeholder() {
        let mut store = ChatStore::new();
        let applied = store
            .apply(StoreAction::BeginSubmission {
                topic: "Impact of Quantum Computing on Finance".into(),
            })
            .unwrap();

        let Applied::Submitted {
            user_message_id,
            assistant_message_id,
        } = applied
        else {
            panic!("begin submission did not report both ids");
        };

        assert!(has_prefix_format(&user_message_id, PREFIX_MESSAGE));
        assert!(has_prefix_format(&assistant_message_id, PREFIX_MESSAGE));
        assert_ne!(user_message_id, assistant_message_id);

        let messages = store.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, user_message_id);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Impact of Quantum Computing on Finance");
        assert_eq!(messages[1].id, assistant_message_id);
        assert!(messages[1].is_thinking);
        assert!(messages[1].content.is_empty());
        assert!(messages[1].research_id.is_none());
        assert!(store.is_loading());
        assert_eq!(store.phase(&assistant_message_id), SessionPhase::Submitting);
        assert_eq!(store.phase(&user_message_id), SessionPhase::Idle);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn blank_topic_is_rejected_without_side_effects(#[case] topic: &str) {
        let mut store = ChatStore::new();
        let err = store.begin_submission(topic).unwrap_err();
        assert!(matches!(err, SessionError::EmptyTopic));
        assert!(store.messages().is_empty());
        assert!(!store.is_loading());
    }

    #[test]
    fn id_failure_leaves_thread_untouched() {
        let mut store = ChatStore::new();
        // Popped from the back: the user id succeeds, the assistant id fails.
        let mut ids = vec![
            Err(CoreError::IdGeneration("entropy source unavailable".into())),
            Ok("msg-00000001".to_owned()),
        ];

        let err = store
            .begin_submission_with("EVs", || ids.pop().unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Core(CoreError::IdGeneration(_))
        ));
        assert!(store.messages().is_empty());
        assert!(!store.is_loading());
        assert!(store.active_message_ids().is_empty());
    }

    #[test]
    fn assistant_id_never_repeats_user_id() {
        let mut store = ChatStore::new();
        let mut ids = ["msg-00000001", "msg-00000001", "msg-00000002"].into_iter();

        let (user, assistant) = store
            .begin_submission_with("EVs", || Ok(ids.next().unwrap().to_owned()))
            .unwrap();

        assert_eq!(user, "msg-00000001");
        assert_eq!(assistant, "msg-00000002");
        assert_eq!(store.messages().len(), 2);
    }

    #[test]
    fn try_begin_refuses_while_loading() {
        let mut store = ChatStore::new();
        store.try_begin_submission("first").unwrap();

        let err = store.try_begin_submission("second").unwrap_err();

        assert!(matches!(err, SessionError::Busy));
        assert_eq!(store.messages().len(), 2);
    }

    #[rstest]
    #[case(SessionPhase::Idle, false, false)]
    #[case(SessionPhase::Submitting, false, false)]
    #[case(SessionPhase::Polling, false, false)]
    #[case(SessionPhase::Complete, true, true)]
    #[case(SessionPhase::Error, true, true)]
    #[case(SessionPhase::Abandoned, true, false)]
    fn terminal_and_resolved_phases(
        #[case] phase: SessionPhase,
        #[case] terminal: bool,
        #[case] resolved: bool,
    ) {
        assert_eq!(phase.is_terminal(), terminal);
        assert_eq!(phase.is_resolved(), resolved);
    }

    #[test]
    fn research_id_is_immutable_once_attached() {
        let (mut store, assistant) = polling_store();

        let same = store.attach_research_id(&assistant, "abc123".into()).unwrap();
        assert_eq!(same, Applied::Attached);

        let err = store
            .attach_research_id(&assistant, "zzz999".into())
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::InvalidTransition { .. })
        ));
        assert_eq!(
            store.message(&assistant).unwrap().research_id.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn submission_failure_surfaces_reason_and_clears_loading() {
        let mut store = ChatStore::new();
        let (_, assistant) = store.begin_submission("EVs").unwrap();

        let applied = store
            .apply(StoreAction::SubmissionFailed {
                message_id: assistant.clone(),
                reason: "connection refused".into(),
            })
            .unwrap();

        assert_eq!(applied, Applied::Failed);
        let message = store.message(&assistant).unwrap();
        assert_eq!(message.content, "Error starting research: connection refused");
        assert!(!message.is_thinking);
        assert!(!store.is_loading());
        assert_eq!(store.phase(&assistant), SessionPhase::Error);
    }

    #[test]
    fn non_terminal_snapshot_updates_state_and_sources() {
        let (mut store, assistant) = polling_store();

        let applied = store
            .apply_snapshot(
                &assistant,
                ResearchState {
                    status: ResearchStatus::InProgress,
                    web_findings: vec![finding("w1"), finding("w2")],
                    technical_findings: vec![finding("t1")],
                    business_findings: vec![finding("b1")],
                    progress_updates: vec!["Research started".into()],
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(applied, Applied::Updated);
        let message = store.message(&assistant).unwrap();
        let sources: Vec<&str> = message.sources.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(sources, vec!["w1", "w2", "t1", "b1"]);
        assert!(message.is_thinking);
        assert!(message.content.is_empty());
        assert!(store.is_loading());
    }

    #[test]
    fn later_snapshot_replaces_earlier_wholesale() {
        let (mut store, assistant) = polling_store();
        store
            .apply_snapshot(
                &assistant,
                ResearchState {
                    web_findings: vec![finding("w1"), finding("w2")],
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .apply_snapshot(
                &assistant,
                ResearchState {
                    technical_findings: vec![finding("t1")],
                    ..Default::default()
                },
            )
            .unwrap();

        let message = store.message(&assistant).unwrap();
        assert_eq!(message.sources, vec![finding("t1")]);
        assert!(message.research_state.as_ref().unwrap().web_findings.is_empty());
    }

    #[rstest]
    #[case::complete_with_body(ResearchStatus::Complete, None, Some("# Report\n..."), SessionPhase::Complete, "# Report\n...")]
    #[case::complete_without_body(ResearchStatus::Complete, None, None, SessionPhase::Complete, COMPLETION_NOTICE)]
    #[case::error_status(ResearchStatus::Error, None, None, SessionPhase::Error, COMPLETION_NOTICE)]
    #[case::html_while_in_progress(
        ResearchStatus::InProgress,
        Some("<html>...</html>"),
        None,
        SessionPhase::Complete,
        COMPLETION_NOTICE
    )]
    fn finishing_snapshot_finalizes(
        #[case] status: ResearchStatus,
        #[case] html: Option<&str>,
        #[case] body: Option<&str>,
        #[case] expected_phase: SessionPhase,
        #[case] expected_content: &str,
    ) {
        let (mut store, assistant) = polling_store();

        let applied = store
            .apply_snapshot(
                &assistant,
                ResearchState {
                    status,
                    html_output: html.map(Into::into),
                    synthesized_content: body.map(Into::into),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(applied, Applied::Finalized(expected_phase));
        let message = store.message(&assistant).unwrap();
        assert_eq!(message.content, expected_content);
        assert!(!message.is_thinking);
        assert!(!store.is_loading());
        assert_eq!(store.phase(&assistant), expected_phase);
    }

    #[test]
    fn snapshots_after_terminal_are_ignored() {
        let (mut store, assistant) = polling_store();
        store
            .apply_snapshot(
                &assistant,
                ResearchState {
                    status: ResearchStatus::Complete,
                    synthesized_content: Some("final".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let applied = store
            .apply_snapshot(
                &assistant,
                ResearchState {
                    status: ResearchStatus::InProgress,
                    web_findings: vec![finding("late")],
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(applied, Applied::Ignored);
        let message = store.message(&assistant).unwrap();
        assert_eq!(message.content, "final");
        assert!(message.sources.is_empty());
        assert_eq!(
            message.research_state.as_ref().unwrap().status,
            ResearchStatus::Complete
        );
    }

    #[test]
    fn snapshot_before_attach_is_rejected() {
        let mut store = ChatStore::new();
        let (_, assistant) = store.begin_submission("EVs").unwrap();
        let err = store
            .apply_snapshot(&assistant, ResearchState::default())
            .unwrap_err();
        assert!(matches!(err, SessionError::Core(_)));
    }

    #[test]
    fn abandon_stops_session_once() {
        let (mut store, assistant) = polling_store();

        assert_eq!(
            store.abandon(&assistant).unwrap(),
            Applied::Finalized(SessionPhase::Abandoned)
        );
        assert_eq!(store.abandon(&assistant).unwrap(), Applied::Ignored);

        let message = store.message(&assistant).unwrap();
        assert_eq!(message.content, ABANDONED_NOTICE);
        assert!(!message.is_thinking);
        assert!(!store.is_loading());
        assert!(store.active_message_ids().is_empty());
    }

    #[test]
    fn attach_after_abandon_is_ignored() {
        let mut store = ChatStore::new();
        let (_, assistant) = store.begin_submission("EVs").unwrap();
        store.abandon(&assistant).unwrap();

        let applied = store.attach_research_id(&assistant, "abc123".into()).unwrap();
        assert_eq!(applied, Applied::Ignored);
        assert!(store.message(&assistant).unwrap().research_id.is_none());
    }

    #[test]
    fn unknown_message_is_reported() {
        let mut store = ChatStore::new();
        let err = store.abandon("msg-deadbeef").unwrap_err();
        assert!(matches!(err, SessionError::UnknownMessage(id) if id == "msg-deadbeef"));
    }

    #[test]
    fn loading_flag_is_shared_across_sessions() {
        let mut store = ChatStore::new();
        let (_, first) = store.begin_submission("first").unwrap();
        let (_, second) = store.begin_submission("second").unwrap();
        assert_eq!(store.messages().len(), 4);
        assert_eq!(store.active_message_ids(), vec![first.clone(), second]);

        store.fail_submission(&first, "boom").unwrap();
        assert!(!store.is_loading());
        assert_eq!(store.last_assistant().unwrap().content, "");
    }
}
