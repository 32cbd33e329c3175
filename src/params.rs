use thiserror::Error;

/// Replacement for a requested temperature of exactly zero. The engine
/// divides logits by the temperature, so zero must never reach it.
pub const TEMPERATURE_EPSILON: f64 = 0.001;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("story_temp {value:?} is not a number")]
    Temperature { value: String },
    #[error("max_len {value:?} is not an integer")]
    MaxLength { value: String },
}

/// Fully-defaulted, typed form of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub topic: String,
    /// `None` means "use engine default sampling", not "unset".
    pub story_temperature: Option<f64>,
    pub max_length: i64,
}

/// Fallback values applied when a request omits a field.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub topic: String,
    pub story_temperature: f64,
    pub max_length: i64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            topic: String::new(),
            story_temperature: 0.5,
            max_length: 100,
        }
    }
}

/// Coerces the raw request fields into a [`GenerationConfig`].
///
/// Each field is handled independently. The literal string "none" (any
/// casing) is meaningful for temperature (explicit engine-default sampling)
/// and max length (fall back to the default); an empty or absent value always
/// falls back to the default; anything else must parse as the expected
/// numeric type or the whole request fails with [`ParameterError`]. Negative
/// values are passed through uninterpreted, range policy belongs to the
/// engine.
pub fn normalize(
    raw_topic: Option<&str>,
    raw_temperature: Option<&str>,
    raw_max_length: Option<&str>,
    defaults: &Defaults,
) -> Result<GenerationConfig, ParameterError> {
    let topic = raw_topic
        .map(str::to_owned)
        .unwrap_or_else(|| defaults.topic.clone());
    let story_temperature = normalize_temperature(raw_temperature, defaults.story_temperature)?;
    let max_length = normalize_max_length(raw_max_length, defaults.max_length)?;

    Ok(GenerationConfig {
        topic,
        story_temperature,
        max_length,
    })
}

fn normalize_temperature(raw: Option<&str>, default: f64) -> Result<Option<f64>, ParameterError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(Some(default)),
    };
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if raw.is_empty() {
        return Ok(Some(default));
    }
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ParameterError::Temperature {
            value: raw.to_owned(),
        })?;
    // Guard the engine's logit division.
    if value == 0.0 {
        Ok(Some(TEMPERATURE_EPSILON))
    } else {
        Ok(Some(value))
    }
}

fn normalize_max_length(raw: Option<&str>, default: i64) -> Result<i64, ParameterError> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(default),
    };
    if raw.eq_ignore_ascii_case("none") || raw.is_empty() {
        return Ok(default);
    }
    raw.trim().parse().map_err(|_| ParameterError::MaxLength {
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Defaults {
        Defaults::default()
    }

    #[test]
    fn temperature_none_literal_is_explicit_none() {
        for raw in ["none", "NONE", "None", "nOnE"] {
            let config = normalize(Some("x"), Some(raw), None, &defaults()).unwrap();
            assert_eq!(config.story_temperature, None, "raw {raw:?}");
        }
    }

    #[test]
    fn temperature_zero_is_remapped_to_epsilon() {
        for raw in ["0", "0.0", "-0.0"] {
            let config = normalize(None, Some(raw), None, &defaults()).unwrap();
            assert_eq!(
                config.story_temperature,
                Some(TEMPERATURE_EPSILON),
                "raw {raw:?}"
            );
        }
    }

    #[test]
    fn temperature_empty_or_absent_uses_default() {
        let config = normalize(None, Some(""), None, &defaults()).unwrap();
        assert_eq!(config.story_temperature, Some(0.5));

        let config = normalize(None, None, None, &defaults()).unwrap();
        assert_eq!(config.story_temperature, Some(0.5));
    }

    #[test]
    fn temperature_passes_numeric_values_through() {
        let config = normalize(None, Some("0.7"), None, &defaults()).unwrap();
        assert_eq!(config.story_temperature, Some(0.7));

        // Negative values are not this layer's problem.
        let config = normalize(None, Some("-1.5"), None, &defaults()).unwrap();
        assert_eq!(config.story_temperature, Some(-1.5));
    }

    #[test]
    fn temperature_garbage_is_a_parameter_error() {
        let err = normalize(None, Some("abc"), None, &defaults()).unwrap_err();
        assert_eq!(
            err,
            ParameterError::Temperature {
                value: "abc".to_owned()
            }
        );
    }

    #[test]
    fn max_length_none_literal_uses_default() {
        for raw in ["none", "NONE", ""] {
            let config = normalize(None, None, Some(raw), &defaults()).unwrap();
            assert_eq!(config.max_length, 100, "raw {raw:?}");
        }
        let config = normalize(None, None, None, &defaults()).unwrap();
        assert_eq!(config.max_length, 100);
    }

    #[test]
    fn max_length_parses_integers_only() {
        let config = normalize(None, None, Some("50"), &defaults()).unwrap();
        assert_eq!(config.max_length, 50);

        let config = normalize(None, None, Some("-3"), &defaults()).unwrap();
        assert_eq!(config.max_length, -3);

        let err = normalize(None, None, Some("5.0"), &defaults()).unwrap_err();
        assert_eq!(
            err,
            ParameterError::MaxLength {
                value: "5.0".to_owned()
            }
        );
    }

    #[test]
    fn topic_is_passed_through_verbatim() {
        let config = normalize(Some(""), None, None, &defaults()).unwrap();
        assert_eq!(config.topic, "");

        let config = normalize(Some("forest"), None, None, &defaults()).unwrap();
        assert_eq!(config.topic, "forest");

        let custom = Defaults {
            topic: "a dark wood".to_owned(),
            ..Defaults::default()
        };
        let config = normalize(None, None, None, &custom).unwrap();
        assert_eq!(config.topic, "a dark wood");
    }

    #[test]
    fn fields_are_parsed_independently() {
        // A bad max_len fails even when the temperature is fine.
        let err = normalize(Some("forest"), Some("0.7"), Some("many"), &defaults()).unwrap_err();
        assert!(matches!(err, ParameterError::MaxLength { .. }));
    }
}
