use std::path::Path;

use tch::{Device, Tensor, no_grad};
use tokenizers::Tokenizer;

use crate::engine::{EngineError, EngineRequest, StoryEngine};

const EOS_TOKEN: i64 = 50256;

/// Traced GPT-2 backend. One instance per process; loading the TorchScript
/// module is the expensive step the service pays once at startup.
pub struct Gpt2Engine {
    label: String,
    device: Device,
    tokenizer: Tokenizer,
    module: tch::CModule,
}

impl Gpt2Engine {
    pub fn load(
        label: &str,
        module_path: &Path,
        tokenizer_path: &Path,
        device: Device,
    ) -> Result<Self, EngineError> {
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EngineError::Tokenizer(e.to_string()))?;

        if !module_path.exists() {
            return Err(EngineError::Init(format!(
                "model artifact missing: {}",
                module_path.display()
            )));
        }
        let mut module = tch::CModule::load_on_device(module_path, device)
            .map_err(|e| EngineError::Init(e.to_string()))?;
        module.set_eval();

        tracing::info!(label, path = %module_path.display(), "loaded generation module");

        Ok(Self {
            label: label.to_string(),
            device,
            tokenizer,
            module,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn next_token(&self, logits: &Tensor, temperature: Option<f64>) -> i64 {
        match temperature {
            // Temperature scaling, then multinomial sampling. The normalizer
            // guarantees the temperature is never exactly zero.
            Some(temperature) => {
                let probs = (logits / temperature).softmax(-1, tch::Kind::Float);
                probs.multinomial(1, true).int64_value(&[0])
            }
            // No temperature means engine-default sampling: greedy argmax.
            None => logits.argmax(0, false).int64_value(&[]),
        }
    }
}

impl StoryEngine for Gpt2Engine {
    fn generate(&mut self, request: &EngineRequest) -> Result<String, EngineError> {
        if request.max_length <= 0 {
            return Err(EngineError::Rejected(format!(
                "max_len must be positive, got {}",
                request.max_length
            )));
        }
        if let Some(temperature) = request.temperature {
            if temperature < 0.0 {
                return Err(EngineError::Rejected(format!(
                    "story_temp must be positive, got {temperature}"
                )));
            }
        }

        // An empty topic is a valid request: generation starts from scratch.
        let encoding = self
            .tokenizer
            .encode(request.topic.as_str(), true)
            .map_err(|e| EngineError::Tokenizer(e.to_string()))?;
        let mut input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        if input_ids.is_empty() {
            input_ids.push(0);
        }
        let prompt_token_len = input_ids.len();

        no_grad(|| {
            for _ in 0..request.max_length {
                let input_tensor = Tensor::from_slice(&input_ids)
                    .reshape([1, input_ids.len() as i64])
                    .to(self.device);

                // The traced model may return a bare tensor or a
                // (logits, past) tuple.
                let output = self
                    .module
                    .forward_is(&[tch::IValue::Tensor(input_tensor)])
                    .map_err(|e| EngineError::Generation(e.to_string()))?;
                let logits = match output {
                    tch::IValue::Tensor(t) => t,
                    tch::IValue::Tuple(ref tuple) if !tuple.is_empty() => match &tuple[0] {
                        tch::IValue::Tensor(t) => t.shallow_clone(),
                        _ => {
                            return Err(EngineError::Generation(
                                "expected tensor as first tuple element".into(),
                            ));
                        }
                    },
                    _ => {
                        return Err(EngineError::Generation(
                            "unexpected model output format".into(),
                        ));
                    }
                };

                // Logits for the last position: shape [1, seq_len, vocab].
                let last_logits = logits.select(1, -1).squeeze();
                let next_token_id = self.next_token(&last_logits, request.temperature);
                input_ids.push(next_token_id);

                if next_token_id == EOS_TOKEN {
                    break;
                }
            }

            Ok::<(), EngineError>(())
        })?;

        let generated_ids: Vec<u32> = input_ids[prompt_token_len..]
            .iter()
            .map(|&id| id as u32)
            .collect();
        self.tokenizer
            .decode(&generated_ids, true)
            .map_err(|e| EngineError::Tokenizer(e.to_string()))
    }
}
