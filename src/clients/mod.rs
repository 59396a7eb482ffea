pub mod openai;
pub mod traits;

pub use openai::{OpenAiCompatClient, SseTextParser};
pub use traits::{ChatMessage, GenerationError, GenerationRequest, TextGenerator};
