//! Per-message decision flow of the assistant
//!
//! For each message the orchestrator resolves the user's session, then picks
//! exactly one of: introduction, refusal, follow-up, search-augmented answer,
//! or direct answer.

pub mod classifier;
pub mod prompts;

pub use classifier::FinanceClassifier;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AssistantConfig, SessionScope};
use crate::providers::{CompletionRequest, LlmProvider, ProviderError};
use crate::search::{SearchClient, SearchError};
use crate::session::{Message, Session, SessionStore};
use prompts::{DIRECT_INSTRUCTION, GREETINGS, INTRODUCTION, REFUSAL, SEARCH_INSTRUCTION, SEARCH_TRIGGERS};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("web search failed: {0}")]
    Search(#[from] SearchError),

    #[error("finance classification failed: {0}")]
    Classifier(#[source] ProviderError),

    #[error("completion failed: {0}")]
    Completion(#[source] ProviderError),
}

/// Parameters of every answer completion
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub model: String,
    pub temperature: f32,
    pub history_depth: u32,
    pub session_scope: SessionScope,
}

impl OrchestratorSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self::from_config(&AssistantConfig::default(), model)
    }

    pub fn from_config(config: &AssistantConfig, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: config.temperature,
            history_depth: config.history_depth,
            session_scope: config.session_scope.clone(),
        }
    }

    pub fn with_session_scope(mut self, scope: SessionScope) -> Self {
        self.session_scope = scope;
        self
    }
}

pub struct Orchestrator {
    sessions: Arc<SessionStore>,
    search: Arc<dyn SearchClient>,
    provider: Arc<dyn LlmProvider>,
    classifier: FinanceClassifier,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<SessionStore>,
        search: Arc<dyn SearchClient>,
        provider: Arc<dyn LlmProvider>,
        settings: OrchestratorSettings,
    ) -> Self {
        let classifier = FinanceClassifier::new(Arc::clone(&provider), settings.model.clone());
        Self {
            sessions,
            search,
            provider,
            classifier,
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Produces the reply to one user message.
    ///
    /// The user's session stays locked for the whole call, so concurrent
    /// messages from one user are handled one at a time.
    pub async fn handle_message(
        &self,
        user_id: &str,
        message: &str,
    ) -> Result<String, OrchestratorError> {
        let handle = self.sessions.get_or_create(user_id).await;
        let mut session = handle.lock().await;
        let normalized = normalize(message);

        if !session.has_introduced {
            // Greetings and anything else get the same introduction
            debug!(
                user_id = %user_id,
                greeting = is_greeting(&normalized),
                "First contact, sending introduction"
            );
            session.add_message(Message::user(message));
            session.has_introduced = true;
            session.add_message(Message::assistant(INTRODUCTION));
            return Ok(INTRODUCTION.to_string());
        }

        let is_finance = self
            .classifier
            .is_finance_query(message)
            .await
            .map_err(OrchestratorError::Classifier)?;
        if !is_finance {
            info!(user_id = %user_id, "Refusing non-finance message");
            return Ok(REFUSAL.to_string());
        }

        // Dormant: nothing sets pending_followup yet
        if session.pending_followup {
            debug!(user_id = %user_id, "Answering pending follow-up");
            let reply = self.complete(&mut session, message.to_string(), true).await?;
            session.pending_followup = false;
            return Ok(reply);
        }

        let do_search = should_search(message);
        info!(user_id = %user_id, do_search = do_search, "Dispatching finance message");

        let content = if do_search {
            self.search.search(message).await?
        } else {
            message.to_string()
        };

        self.complete(&mut session, content, do_search).await
    }

    /// Sends `content` to the completion service and records the answer.
    ///
    /// Only the assistant side is appended to history on this path.
    async fn complete(
        &self,
        session: &mut Session,
        content: String,
        do_search: bool,
    ) -> Result<String, OrchestratorError> {
        let system = if do_search {
            SEARCH_INSTRUCTION
        } else {
            DIRECT_INSTRUCTION
        };
        let session_id = self
            .settings
            .session_scope
            .remote_session_id(&session.user_id)
            .to_string();

        let request = CompletionRequest::new(self.settings.model.as_str(), system, content)
            .with_temperature(self.settings.temperature)
            .with_history_depth(self.settings.history_depth)
            .with_session_id(session_id);

        let response = self
            .provider
            .generate(request)
            .await
            .map_err(OrchestratorError::Completion)?;

        session.add_message(Message::assistant(response.content.as_str()));
        Ok(response.content)
    }
}

/// Trimmed, lowercased form used for comparisons only
pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

pub fn is_greeting(normalized: &str) -> bool {
    GREETINGS.contains(&normalized)
}

/// True when any trigger occurs anywhere in the lowercased message.
///
/// Plain substring containment: "understocking" matches "stock".
pub fn should_search(message: &str) -> bool {
    let lowered = message.to_lowercase();
    SEARCH_TRIGGERS
        .iter()
        .any(|trigger| lowered.contains(trigger))
}
