pub mod error;
pub mod openai;
pub mod traits;
mod util;

pub use error::AiError;
pub use openai::OpenAi;
pub use traits::{Agent, Message, MessageRole, PromptBuilder};
