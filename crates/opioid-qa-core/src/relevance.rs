//! Topic gate in front of the answering path.
//!
//! Fails closed: a provider failure is reported as
//! [`Classification::Unavailable`], which never counts as in-domain.

use std::sync::Arc;

use ai_client::Message;
use tracing::{debug, warn};

use crate::completion::{CompletionRequest, CompletionService};

/// Vocabulary that defines the service's subject domain.
pub const DOMAIN_TOPICS: &[&str] = &[
    "overdose",
    "withdrawal",
    "prescription painkillers",
    "fentanyl",
    "narcotics",
    "analgesics",
    "opiates",
    "opioid crisis",
    "addiction",
    "naloxone",
    "rehab",
];

const AFFIRMATIVE: &str = "yes";
const VERDICT_MAX_TOKENS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    InDomain,
    OutOfDomain,
    /// The provider could not be reached or did not answer usably.
    Unavailable { reason: String },
}

impl Classification {
    pub fn is_in_domain(&self) -> bool {
        matches!(self, Classification::InDomain)
    }

    /// Only an exact, case-insensitive "yes" is in-domain.
    pub fn from_reply(reply: &str) -> Self {
        if reply.trim().eq_ignore_ascii_case(AFFIRMATIVE) {
            Classification::InDomain
        } else {
            Classification::OutOfDomain
        }
    }
}

/// Build the single-message instruction sent to the classifier.
pub fn relevance_prompt(question: &str) -> String {
    let topics = match DOMAIN_TOPICS.split_last() {
        Some((last, rest)) => format!("{}, or {}", rest.join(", "), last),
        None => String::new(),
    };
    format!(
        "Determine if the following question is related to opioids OR related topics such as {topics}. \
         Respond with 'yes' if it is related and 'no' if it is not.\n\nQuestion: {question}"
    )
}

pub struct RelevanceClassifier {
    completion: Arc<dyn CompletionService>,
}

impl RelevanceClassifier {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    pub async fn classify(&self, question: &str) -> Classification {
        let request = CompletionRequest::new(vec![Message::user(relevance_prompt(question))])
            .max_tokens(VERDICT_MAX_TOKENS)
            .temperature(0.0);

        match self.completion.complete(request).await {
            Ok(reply) => {
                let verdict = Classification::from_reply(&reply);
                debug!(reply = %reply.trim(), ?verdict, "Relevance verdict");
                verdict
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(error = %reason, "Relevance classification failed; treating as out of domain");
                Classification::Unavailable { reason }
            }
        }
    }
}
