use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::task;

use crate::{
    engine::{EngineError, EngineRequest, StoryEngine},
    error::ServiceError,
    params::GenerationConfig,
};

/// Owns the process's single engine instance and serializes access to it.
///
/// The engine holds internal mutable state across calls, so concurrent
/// invocation without the mutex could interleave generations. Calls run on
/// the blocking pool; the async runtime is never parked on the engine.
pub struct GeneratorHandle {
    engine: Arc<Mutex<Box<dyn StoryEngine>>>,
    timeout: Option<Duration>,
}

impl GeneratorHandle {
    pub fn new(engine: Box<dyn StoryEngine>, timeout: Option<Duration>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            timeout,
        }
    }

    /// Invokes the engine once for `config`. No retry: an engine failure
    /// propagates unmodified. When a timeout is configured the wait is
    /// abandoned after it elapses; the blocking call itself is not
    /// interrupted.
    pub async fn invoke(&self, config: &GenerationConfig) -> Result<String, ServiceError> {
        let request = EngineRequest::from_config(config);
        let engine = self.engine.clone();
        let generation = task::spawn_blocking(move || engine.lock().generate(&request));

        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, generation)
                .await
                .map_err(|_| ServiceError::Timeout)?,
            None => generation.await,
        };

        let raw = joined
            .map_err(|err| EngineError::Generation(format!("generation task failed: {err}")))??;
        Ok(raw)
    }
}
