pub mod gateway;
pub mod json;
pub mod prompts;
pub mod types;

#[cfg(feature = "providers")]
pub mod gemini;
#[cfg(feature = "providers")]
pub mod openai;

pub use gateway::*;
pub use json::{clean_json_output, extract_json_span, parse_json_response, strip_code_fences};

#[cfg(feature = "providers")]
pub use gemini::GeminiProvider;
#[cfg(feature = "providers")]
pub use openai::OpenAiProvider;
