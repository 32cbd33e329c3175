use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

#[cfg(feature = "tch-backend")]
use tch::Device;

use crate::params::Defaults;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub log_dir: PathBuf,
    /// Identity label the engine is constructed with at startup.
    pub generator_label: String,
    pub default_topic: String,
    pub default_story_temp: f64,
    pub default_max_len: i64,
    /// No timeout unless an enclosing deployment sets one; a generation call
    /// otherwise blocks its request until the engine returns.
    pub generation_timeout: Option<Duration>,
    #[cfg(feature = "tch-backend")]
    pub model_path: PathBuf,
    #[cfg(feature = "tch-backend")]
    pub tokenizer_path: PathBuf,
    #[cfg(feature = "tch-backend")]
    pub device: Device,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080));

        let log_dir = PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
        let generator_label =
            env::var("GENERATOR_LABEL").unwrap_or_else(|_| "Unthank".to_string());

        let default_topic = env::var("DEFAULT_TOPIC").unwrap_or_default();
        let default_story_temp = env::var("STORY_TEMP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.5);
        let default_max_len = env::var("MAX_LEN")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let generation_timeout = env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs);

        #[cfg(feature = "tch-backend")]
        let model_path = PathBuf::from(
            env::var("MODEL_PATH").unwrap_or_else(|_| "models/gpt2_story.ts".to_string()),
        );
        #[cfg(feature = "tch-backend")]
        let tokenizer_path = PathBuf::from(
            env::var("TOKENIZER_PATH").unwrap_or_else(|_| "models/tokenizer.json".to_string()),
        );
        #[cfg(feature = "tch-backend")]
        let device = {
            let raw = env::var("DEVICE").unwrap_or_else(|_| "cpu".into());
            parse_device(&raw)
        };

        Ok(Self {
            listen_addr,
            log_dir,
            generator_label,
            default_topic,
            default_story_temp,
            default_max_len,
            generation_timeout,
            #[cfg(feature = "tch-backend")]
            model_path,
            #[cfg(feature = "tch-backend")]
            tokenizer_path,
            #[cfg(feature = "tch-backend")]
            device,
        })
    }

    /// Normalization fallbacks for requests that omit fields.
    pub fn defaults(&self) -> Defaults {
        Defaults {
            topic: self.default_topic.clone(),
            story_temperature: self.default_story_temp,
            max_length: self.default_max_len,
        }
    }
}

#[cfg(feature = "tch-backend")]
fn parse_device(raw: &str) -> Device {
    let lower = raw.to_lowercase();
    if lower == "cpu" {
        Device::Cpu
    } else if lower.starts_with("cuda") {
        let idx = lower
            .split(':')
            .nth(1)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        if tch::Cuda::is_available() {
            Device::Cuda(idx)
        } else {
            Device::Cpu
        }
    } else {
        Device::Cpu
    }
}
