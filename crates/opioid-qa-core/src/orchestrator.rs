use std::sync::Arc;

use tracing::{info, warn};

use crate::answerer::GroundedAnswerer;
use crate::completion::CompletionService;
use crate::corpus::CorpusText;
use crate::relevance::{Classification, RelevanceClassifier};

pub const EMPTY_QUESTION_PROMPT: &str = "Please ask a valid question.";
pub const REFUSAL_MESSAGE: &str =
    "Sorry, I can only answer questions related to opioids, addiction, overdose, or withdrawal.";

/// Per-request pipeline: empty-input check, topic gate, grounded answer.
///
/// Holds no per-request state; one instance serves all requests concurrently.
pub struct QueryOrchestrator {
    classifier: RelevanceClassifier,
    answerer: GroundedAnswerer,
    corpus: Arc<CorpusText>,
}

impl QueryOrchestrator {
    pub fn new(
        classifier: RelevanceClassifier,
        answerer: GroundedAnswerer,
        corpus: Arc<CorpusText>,
    ) -> Self {
        Self {
            classifier,
            answerer,
            corpus,
        }
    }

    /// Classifier and answerer share one completion backend.
    pub fn with_completion(completion: Arc<dyn CompletionService>, corpus: CorpusText) -> Self {
        Self::new(
            RelevanceClassifier::new(completion.clone()),
            GroundedAnswerer::new(completion),
            Arc::new(corpus),
        )
    }

    pub fn corpus(&self) -> &CorpusText {
        &self.corpus
    }

    /// Answer `raw`, always with a string. Absent input counts as empty.
    pub async fn handle_question(&self, raw: Option<&str>) -> String {
        let question = raw.unwrap_or_default().trim();
        if question.is_empty() {
            return EMPTY_QUESTION_PROMPT.to_string();
        }

        match self.classifier.classify(question).await {
            Classification::InDomain => {
                info!(question_chars = question.len(), "Answering in-domain question");
                self.answerer.answer(question, &self.corpus).await
            }
            Classification::OutOfDomain => {
                info!(question_chars = question.len(), "Refusing out-of-domain question");
                REFUSAL_MESSAGE.to_string()
            }
            Classification::Unavailable { reason } => {
                warn!(%reason, "Classifier unavailable; refusing");
                REFUSAL_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCompletion, Reply};

    fn orchestrator(mock: &Arc<MockCompletion>) -> QueryOrchestrator {
        QueryOrchestrator::with_completion(mock.clone(), CorpusText::new("Opioids are drugs..."))
    }

    #[tokio::test]
    async fn absent_input_is_treated_as_empty() {
        let mock = Arc::new(MockCompletion::new());
        let answer = orchestrator(&mock).handle_question(None).await;

        assert_eq!(answer, EMPTY_QUESTION_PROMPT);
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn question_is_trimmed_before_classification() {
        let mock = Arc::new(
            MockCompletion::new()
                .classify_with(Reply::text("yes"))
                .answer_with(Reply::text("An opioid antagonist.")),
        );

        let answer = orchestrator(&mock)
            .handle_question(Some("   What is naloxone?  \n"))
            .await;

        assert_eq!(answer, "An opioid antagonist.");
        let requests = mock.requests();
        assert!(requests[0].messages[0].content.ends_with("Question: What is naloxone?"));
        assert!(requests[1].messages[1].content.ends_with("Question: What is naloxone?"));
    }

    #[tokio::test]
    async fn off_topic_question_skips_answerer() {
        let mock = Arc::new(
            MockCompletion::new()
                .classify_with(Reply::text("no"))
                .answer_with(Reply::text("should never be used")),
        );

        let answer = orchestrator(&mock)
            .handle_question(Some("What's the capital of France?"))
            .await;

        assert_eq!(answer, REFUSAL_MESSAGE);
        assert_eq!(mock.classify_calls(), 1);
        assert_eq!(mock.answer_calls(), 0);
    }
}
