//! Chat orchestrator: central coordinator for a conversation turn.
//!
//! Validates the message, resolves the session, asks the remote provider
//! for a reply, falls back to the local template engine on any remote
//! error, and persists both sides of the turn.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use solace_core::config::ChatConfig;
use solace_core::types::{ChatMessage, ChatSession};
use solace_engine::LocalResponseEngine;
use solace_remote::crisis::{append_crisis_footer, contains_crisis_language};
use solace_remote::ResponseProvider;
use solace_storage::{derive_session_title, Database, SessionRepository};

use crate::error::ChatError;

/// Assistant replies inspected by the local engine's repetition check.
const RECENT_REPLY_WINDOW: usize = 3;

/// One completed conversation turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub session_id: Uuid,
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
    /// True when the reply came from the local engine instead of the
    /// remote provider.
    pub used_fallback: bool,
}

/// Central chat coordinator.
pub struct ChatOrchestrator {
    engine: LocalResponseEngine,
    provider: Arc<dyn ResponseProvider>,
    repository: SessionRepository,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(config: ChatConfig, db: Arc<Database>, provider: Arc<dyn ResponseProvider>) -> Self {
        Self {
            engine: LocalResponseEngine::builtin(),
            provider,
            repository: SessionRepository::new(db),
            config,
        }
    }

    /// Handle an incoming user message.
    ///
    /// With no `session_id`, a new session is created and titled from the
    /// message. Always produces an assistant reply when the input is
    /// valid: remote provider errors downgrade to the local engine.
    pub async fn handle_message(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
        message: &str,
    ) -> Result<ChatTurn, ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.config.max_message_chars {
            return Err(ChatError::MessageTooLong(self.config.max_message_chars));
        }

        let session = self.resolve_session(user_id, session_id, message)?;

        let history = self
            .repository
            .recent_exchanges(session.id, self.config.history_window)?;

        let (reply, used_fallback) = match self.provider.respond(message, &history).await {
            Ok(reply) => (reply, false),
            Err(e) => {
                warn!(error = %e, "remote provider failed, using local engine");
                (self.local_reply(session.id, message)?, true)
            }
        };

        let user_message = self
            .repository
            .append_message(session.id, user_id, message, true)?;
        let assistant_message = self
            .repository
            .append_message(session.id, user_id, &reply, false)?;

        Ok(ChatTurn {
            session_id: session.id,
            user_message,
            assistant_message,
            used_fallback,
        })
    }

    /// Open a new session and post the engine's greeting into it.
    pub fn greet_new_session(
        &self,
        user_id: Uuid,
    ) -> Result<(ChatSession, ChatMessage), ChatError> {
        let session = self.repository.create_session(user_id, None)?;
        let greeting = self.engine.greeting();
        let message = self
            .repository
            .append_message(session.id, user_id, &greeting, false)?;
        info!(session_id = %session.id, "opened new chat session");
        Ok((session, message))
    }

    /// A user's sessions, most recently active first.
    pub fn sessions(
        &self,
        user_id: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ChatSession>, ChatError> {
        Ok(self.repository.list_sessions(user_id, limit, offset)?)
    }

    /// All messages of one of the user's sessions, oldest first.
    pub fn session_messages(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.owned_session(user_id, session_id)?;
        Ok(self.repository.messages(session_id)?)
    }

    /// Rename one of the user's sessions.
    pub fn rename_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        title: &str,
    ) -> Result<(), ChatError> {
        self.owned_session(user_id, session_id)?;
        Ok(self.repository.rename_session(session_id, title)?)
    }

    /// Delete one of the user's sessions and its messages.
    pub fn delete_session(&self, user_id: Uuid, session_id: Uuid) -> Result<(), ChatError> {
        self.owned_session(user_id, session_id)?;
        Ok(self.repository.delete_session(session_id)?)
    }

    fn resolve_session(
        &self,
        user_id: Uuid,
        session_id: Option<Uuid>,
        first_message: &str,
    ) -> Result<ChatSession, ChatError> {
        match session_id {
            Some(id) => self.owned_session(user_id, id),
            None => {
                let title = derive_session_title(first_message);
                let session = self.repository.create_session(user_id, Some(&title))?;
                info!(session_id = %session.id, "created session from first message");
                Ok(session)
            }
        }
    }

    fn owned_session(&self, user_id: Uuid, session_id: Uuid) -> Result<ChatSession, ChatError> {
        match self.repository.find_session(session_id)? {
            Some(session) if session.user_id == user_id => Ok(session),
            _ => Err(ChatError::SessionNotFound(session_id)),
        }
    }

    fn local_reply(&self, session_id: Uuid, message: &str) -> Result<String, ChatError> {
        let recent = self
            .repository
            .recent_assistant_replies(session_id, RECENT_REPLY_WINDOW)?;
        let reply = self.engine.generate(message, &recent);
        if contains_crisis_language(message) {
            warn!("crisis language detected in user message");
            return Ok(append_crisis_footer(&reply));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solace_core::types::Exchange;
    use solace_remote::RemoteError;
    use std::sync::Mutex;

    struct EchoProvider {
        seen_history: Mutex<Vec<usize>>,
    }

    impl EchoProvider {
        fn new() -> Self {
            Self {
                seen_history: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ResponseProvider for EchoProvider {
        async fn respond(
            &self,
            message: &str,
            history: &[Exchange],
        ) -> Result<String, RemoteError> {
            self.seen_history.lock().unwrap().push(history.len());
            Ok(format!("remote: {}", message))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ResponseProvider for FailingProvider {
        async fn respond(
            &self,
            _message: &str,
            _history: &[Exchange],
        ) -> Result<String, RemoteError> {
            Err(RemoteError::Unavailable)
        }
    }

    fn orchestrator(provider: Arc<dyn ResponseProvider>) -> ChatOrchestrator {
        let db = Arc::new(Database::in_memory().unwrap());
        ChatOrchestrator::new(ChatConfig::default(), db, provider)
    }

    // ---- Validation ----

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let result = orch.handle_message(Uuid::new_v4(), None, "   ").await;
        assert!(matches!(result, Err(ChatError::EmptyMessage)));
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let long = "x".repeat(2001);
        let result = orch.handle_message(Uuid::new_v4(), None, &long).await;
        assert!(matches!(result, Err(ChatError::MessageTooLong(2000))));
    }

    #[tokio::test]
    async fn test_disabled_chat_rejected() {
        let db = Arc::new(Database::in_memory().unwrap());
        let config = ChatConfig {
            enabled: false,
            ..ChatConfig::default()
        };
        let orch = ChatOrchestrator::new(config, db, Arc::new(EchoProvider::new()));
        let result = orch.handle_message(Uuid::new_v4(), None, "hello").await;
        assert!(matches!(result, Err(ChatError::Disabled)));
    }

    // ---- Turn handling ----

    #[tokio::test]
    async fn test_remote_reply_persisted() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let user = Uuid::new_v4();

        let turn = orch.handle_message(user, None, "hello there").await.unwrap();
        assert!(!turn.used_fallback);
        assert_eq!(turn.assistant_message.content, "remote: hello there");
        assert!(turn.user_message.is_user_message);
        assert!(!turn.assistant_message.is_user_message);

        let messages = orch.session_messages(user, turn.session_id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello there");
        assert_eq!(messages[1].content, "remote: hello there");
    }

    #[tokio::test]
    async fn test_new_session_titled_from_first_message() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let user = Uuid::new_v4();

        let turn = orch
            .handle_message(user, None, "I feel anxious about work")
            .await
            .unwrap();

        let sessions = orch.sessions(user, 10, 0).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, turn.session_id);
        assert_eq!(sessions[0].title, "I feel anxious about work");
    }

    #[tokio::test]
    async fn test_follow_up_reuses_session_and_builds_history() {
        let provider = Arc::new(EchoProvider::new());
        let orch = orchestrator(provider.clone());
        let user = Uuid::new_v4();

        let first = orch.handle_message(user, None, "first").await.unwrap();
        let second = orch
            .handle_message(user, Some(first.session_id), "second")
            .await
            .unwrap();

        assert_eq!(first.session_id, second.session_id);
        // First turn saw no history, second saw one completed exchange.
        assert_eq!(*provider.seen_history.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_unknown_session_rejected() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let result = orch
            .handle_message(Uuid::new_v4(), Some(Uuid::new_v4()), "hello")
            .await;
        assert!(matches!(result, Err(ChatError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_other_users_session_rejected() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let turn = orch.handle_message(alice, None, "private").await.unwrap();
        let result = orch
            .handle_message(bob, Some(turn.session_id), "intruding")
            .await;
        assert!(matches!(result, Err(ChatError::SessionNotFound(_))));
    }

    // ---- Fallback ----

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local_engine() {
        let orch = orchestrator(Arc::new(FailingProvider));
        let user = Uuid::new_v4();

        let turn = orch
            .handle_message(user, None, "I feel so anxious and stressed lately")
            .await
            .unwrap();
        assert!(turn.used_fallback);
        assert!(!turn.assistant_message.content.is_empty());

        // Both sides of the turn still persisted.
        let messages = orch.session_messages(user, turn.session_id).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_avoids_repeating_itself() {
        let orch = orchestrator(Arc::new(FailingProvider));
        let user = Uuid::new_v4();
        let message = "I feel so anxious and stressed about everything lately";

        let first = orch.handle_message(user, None, message).await.unwrap();
        let second = orch
            .handle_message(user, Some(first.session_id), message)
            .await
            .unwrap();

        assert_ne!(
            first.assistant_message.content,
            second.assistant_message.content
        );
    }

    #[tokio::test]
    async fn test_fallback_crisis_message_gets_hotline_footer() {
        let orch = orchestrator(Arc::new(FailingProvider));
        let turn = orch
            .handle_message(Uuid::new_v4(), None, "I have been feeling suicidal")
            .await
            .unwrap();
        assert!(turn.assistant_message.content.contains("988"));
        assert!(turn.assistant_message.content.contains("741741"));
    }

    // ---- Session management ----

    #[tokio::test]
    async fn test_greet_new_session_persists_greeting() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let user = Uuid::new_v4();

        let (session, greeting) = orch.greet_new_session(user).unwrap();
        assert!(!greeting.is_user_message);
        assert!(!greeting.content.is_empty());

        let messages = orch.session_messages(user, session.id).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, greeting.content);
    }

    #[tokio::test]
    async fn test_rename_and_delete_require_ownership() {
        let orch = orchestrator(Arc::new(EchoProvider::new()));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let turn = orch.handle_message(alice, None, "mine").await.unwrap();

        assert!(matches!(
            orch.rename_session(bob, turn.session_id, "stolen"),
            Err(ChatError::SessionNotFound(_))
        ));
        assert!(matches!(
            orch.delete_session(bob, turn.session_id),
            Err(ChatError::SessionNotFound(_))
        ));

        orch.rename_session(alice, turn.session_id, "renamed").unwrap();
        orch.delete_session(alice, turn.session_id).unwrap();
        assert!(orch.sessions(alice, 10, 0).unwrap().is_empty());
    }
}
