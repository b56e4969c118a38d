// Test doubles for the pipeline's two trait boundaries:
// - MockCompletion (CompletionService): scripted replies per call kind, call counters
// - StaticSource (DocumentSource): fixed pages or a fixed failure

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ai_client::{AiError, MessageRole};
use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::completion::{CompletionRequest, CompletionService};
use crate::corpus::DocumentSource;

// ---------------------------------------------------------------------------
// MockCompletion
// ---------------------------------------------------------------------------

/// What the mock returns for a call.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    AuthError,
    NetworkError,
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    fn produce(&self) -> Result<String> {
        match self {
            Reply::Text(text) => Ok(text.clone()),
            Reply::AuthError => Err(AiError::Auth(
                "OpenAI API error (401 Unauthorized): Incorrect API key provided".to_string(),
            )
            .into()),
            Reply::NetworkError => {
                Err(AiError::Network("error sending request: connection refused".to_string()).into())
            }
        }
    }
}

/// Scripted completion backend.
///
/// Requests that open with a system message are answer calls; everything else
/// is a classification call. Unscripted calls fail like an unreachable provider.
pub struct MockCompletion {
    classify_reply: Option<Reply>,
    answer_reply: Option<Reply>,
    classify_calls: AtomicUsize,
    answer_calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            classify_reply: None,
            answer_reply: None,
            classify_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn classify_with(mut self, reply: Reply) -> Self {
        self.classify_reply = Some(reply);
        self
    }

    pub fn answer_with(mut self, reply: Reply) -> Self {
        self.answer_reply = Some(reply);
        self
    }

    pub fn classify_calls(&self) -> usize {
        self.classify_calls.load(Ordering::SeqCst)
    }

    pub fn answer_calls(&self) -> usize {
        self.answer_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.classify_calls() + self.answer_calls()
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let is_answer = request
            .messages
            .first()
            .is_some_and(|m| m.role == MessageRole::System);
        self.requests.lock().unwrap().push(request);

        let reply = if is_answer {
            self.answer_calls.fetch_add(1, Ordering::SeqCst);
            &self.answer_reply
        } else {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            &self.classify_reply
        };

        match reply {
            Some(reply) => reply.produce(),
            None => Reply::NetworkError.produce(),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticSource
// ---------------------------------------------------------------------------

/// In-memory document source.
pub struct StaticSource {
    pages: Vec<String>,
    failure: Option<String>,
}

impl StaticSource {
    pub fn pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            failure: None,
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            pages: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

impl DocumentSource for StaticSource {
    fn describe(&self) -> String {
        "static".to_string()
    }

    fn page_texts(&self) -> Result<Vec<String>> {
        if let Some(ref reason) = self.failure {
            bail!("{reason}");
        }
        Ok(self.pages.clone())
    }
}
