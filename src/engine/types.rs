use thiserror::Error;

use crate::params::GenerationConfig;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    Init(String),
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("request rejected by engine: {0}")]
    Rejected(String),
}

/// One generation request as the engine sees it.
///
/// The last four knobs are accepted but inert: the engine contract reserves
/// them for duplicate suppression, gold-title conditioning, keyword-pass
/// temperature, and out-of-vocabulary handling, none of which the baseline
/// pipeline enables. They are always `None` on the request path.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub topic: String,
    pub temperature: Option<f64>,
    pub max_length: i64,
    pub keyword_temperature: Option<f64>,
    pub dedup: Option<bool>,
    pub use_gold_titles: Option<bool>,
    pub oov_handling: Option<bool>,
}

impl EngineRequest {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            topic: config.topic.clone(),
            temperature: config.story_temperature,
            max_length: config.max_length,
            keyword_temperature: None,
            dedup: None,
            use_gold_titles: None,
            oov_handling: None,
        }
    }
}

/// The generation engine: a long-lived, stateful collaborator exposing a
/// single blocking operation. Implementations are expensive to construct and
/// are built once at process start.
pub trait StoryEngine: Send {
    fn generate(&mut self, request: &EngineRequest) -> Result<String, EngineError>;
}
