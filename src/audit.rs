use std::{fs, io, path::PathBuf};

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::GenerationConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("could not create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("could not write {}: {source}", path.display())]
    WriteFile { path: PathBuf, source: io::Error },
    #[error("could not encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Immutable snapshot of one request, taken after sanitization. Written
/// exactly twice (JSON and text) and never read back by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub topic: String,
    pub story_temp: Option<f64>,
    pub max_len: i64,
    pub response: String,
}

impl LogRecord {
    pub fn new(config: &GenerationConfig, response: &str) -> Self {
        Self {
            topic: config.topic.clone(),
            story_temp: config.story_temperature,
            max_len: config.max_length,
            response: response.to_owned(),
        }
    }
}

/// Writes per-request audit artifacts under a single directory.
///
/// Filenames are keyed by local wall-clock time at one-second granularity,
/// so two requests completing within the same second share a stem and the
/// later write overwrites the earlier one. Accepted limitation, a
/// collision-resistant key would change the on-disk contract.
pub struct AuditLogger {
    dir: PathBuf,
}

impl AuditLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes the JSON and text artifacts for `record`.
    pub fn record(&self, record: &LogRecord) -> Result<(), LoggingError> {
        self.record_at(record, Local::now())
    }

    fn record_at(&self, record: &LogRecord, now: DateTime<Local>) -> Result<(), LoggingError> {
        fs::create_dir_all(&self.dir).map_err(|source| LoggingError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let stem = filename_stem(now);
        let json_path = self.dir.join(format!("{stem}.json"));
        let text_path = self.dir.join(format!("{stem}.txt"));

        let json = serde_json::to_string(record)?;
        fs::write(&json_path, json).map_err(|source| LoggingError::WriteFile {
            path: json_path.clone(),
            source,
        })?;
        fs::write(&text_path, render_text(record)).map_err(|source| LoggingError::WriteFile {
            path: text_path.clone(),
            source,
        })?;

        Ok(())
    }
}

fn filename_stem(t: DateTime<Local>) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}_story",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

fn render_text(record: &LogRecord) -> String {
    let story_temp = match record.story_temp {
        Some(temp) => temp.to_string(),
        None => "none".to_owned(),
    };
    format!(
        "PROMPT: {}\nSTORY_TEMP: {}\nMAX_LEN: {}\n\nRESPONSE\n\n{}",
        record.topic, story_temp, record.max_len, record.response
    )
}
