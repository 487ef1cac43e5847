use std::sync::Arc;

use tracing::debug;

use crate::orchestrator::prompts::{CLASSIFIER_INSTRUCTION, classifier_query};
use crate::providers::{CompletionRequest, LlmProvider, ProviderError};

/// Remote session used only for classification, so verdicts never mix with answers
pub const CLASSIFIER_SESSION_ID: &str = "FinanceClassifier";

/// Model-backed yes/no gate restricting the assistant to finance questions
pub struct FinanceClassifier {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl FinanceClassifier {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Asks the model whether `message` is about finance.
    ///
    /// Fails closed: only an answer starting with "yes" counts as finance.
    pub async fn is_finance_query(&self, message: &str) -> Result<bool, ProviderError> {
        let request = CompletionRequest::new(
            self.model.as_str(),
            CLASSIFIER_INSTRUCTION,
            classifier_query(message),
        )
        .with_temperature(0.0)
        .with_history_depth(0)
        .with_session_id(CLASSIFIER_SESSION_ID);

        let response = self.provider.generate(request).await?;
        let verdict = parse_verdict(&response.content);
        debug!(raw = %response.content.trim(), verdict = verdict, "Finance classifier verdict");
        Ok(verdict)
    }
}

/// True iff the trimmed, lowercased answer starts with "yes"
pub fn parse_verdict(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with("yes")
}
