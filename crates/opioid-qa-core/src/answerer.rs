use std::sync::Arc;

use ai_client::Message;
use tracing::{debug, error};

use crate::completion::{CompletionRequest, CompletionService, ProviderFailure};
use crate::corpus::CorpusText;

/// System framing that steers ambiguous questions toward the subject domain.
pub const DOMAIN_FRAMING: &str = "Assume the user is always asking about opioids or related topics like overdose, addiction, withdrawal, \
     painkillers, fentanyl, heroin, and narcotics, even if they don't explicitly mention 'opioids'.";

pub const PROVIDER_ERROR_PREFIX: &str = "OpenAI API Error";

const ANSWER_MAX_TOKENS: u32 = 2048;
const ANSWER_TEMPERATURE: f32 = 0.7;

/// Embeds the entire corpus in every request; there is no passage selection.
pub fn grounded_prompt(question: &str, corpus: &CorpusText) -> String {
    format!("Here is the document content:\n{corpus}\n\nQuestion: {question}")
}

/// Caller-facing text for a failed generation call.
pub fn failure_answer(failure: &ProviderFailure) -> String {
    match failure {
        ProviderFailure::Authentication(_) => format!(
            "{PROVIDER_ERROR_PREFIX}: authentication failed. Check that the configured API key is valid."
        ),
        ProviderFailure::Other(detail) => format!("{PROVIDER_ERROR_PREFIX}: {detail}"),
    }
}

pub struct GroundedAnswerer {
    completion: Arc<dyn CompletionService>,
}

impl GroundedAnswerer {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn answer(&self, question: &str, corpus: &CorpusText) -> String {
        let request = CompletionRequest::new(vec![
            Message::system(DOMAIN_FRAMING),
            Message::user(grounded_prompt(question, corpus)),
        ])
        .max_tokens(ANSWER_MAX_TOKENS)
        .temperature(ANSWER_TEMPERATURE);

        debug!(corpus_chars = corpus.len(), "Requesting grounded answer");

        match self.completion.complete(request).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                let failure = ProviderFailure::categorize(&e);
                error!(
                    authentication = failure.is_authentication(),
                    error = %failure.detail(),
                    "Answer generation failed"
                );
                failure_answer(&failure)
            }
        }
    }
}
