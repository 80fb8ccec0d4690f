pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod health;
pub mod openai;
pub mod provider;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use error::LlmError;
pub use gemini::GeminiProvider;
pub use health::HealthTracker;
pub use openai::OpenAiProvider;
pub use provider::{ChatRequest, ChatResponse, ImagePart, LlmProvider, Message, ProviderError, Role};
pub use router::{GenerateOutcome, GenerateRequest, Router, SystemKeys, UserKeys};
