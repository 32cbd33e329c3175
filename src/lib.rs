pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod sanitize;
pub mod server;

pub use audit::{AuditLogger, LogRecord, LoggingError};
pub use config::AppConfig;
pub use engine::{EngineError, EngineRequest, GeneratorHandle, StoryEngine};
pub use error::ServiceError;
pub use params::{Defaults, GenerationConfig, ParameterError, normalize};
pub use sanitize::{expand_oov_markers, sanitize};
pub use server::build_router;
