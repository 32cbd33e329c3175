mod invoker;
mod types;

#[cfg(feature = "tch-backend")]
pub mod gpt2;

pub use invoker::GeneratorHandle;
pub use types::{EngineError, EngineRequest, StoryEngine};
