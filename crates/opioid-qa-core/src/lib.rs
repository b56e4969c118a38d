pub mod answerer;
pub mod completion;
pub mod config;
pub mod corpus;
pub mod deps;
pub mod error;
pub mod orchestrator;
pub mod relevance;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use answerer::GroundedAnswerer;
pub use completion::{CompletionRequest, CompletionService, OpenAiCompletion, ProviderFailure};
pub use config::AppConfig;
pub use corpus::{CorpusLoad, CorpusText, DocumentSource, LoadFailurePolicy, PdfSource};
pub use deps::ServerDeps;
pub use error::CoreError;
pub use orchestrator::QueryOrchestrator;
pub use relevance::{Classification, RelevanceClassifier};
