// ABOUTME: Response normalizer turning free-text model replies into validated nutrition records
// ABOUTME: Runs fence stripping, JSON extraction, field coercion, shape validation, and zero fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Normalizer
//!
//! Pure, synchronous pipeline from raw model text to a [`NutritionRecord`]:
//!
//! 1. [`fence::strip_code_fences`]
//! 2. [`extract::extract_json`] (fails with [`NormalizationError::Parse`])
//! 3. defaults for enabled optional string fields
//! 4. numeric checks on `calories`, `protein` (and `carbs`/`fats` when the
//!    macro extension is on), failing with [`NormalizationError::Shape`]
//! 5. [`fallback::apply_zero_estimate_fallback`]
//!
//! Both error variants are terminal for the request; nothing is re-prompted.

pub mod extract;
pub mod fallback;
pub mod fence;

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::nutrition;
use crate::models::{MealQuery, NutritionRecord};

pub use extract::extract_json;
pub use fallback::{apply_zero_estimate_fallback, KnownMealPattern, KNOWN_MEAL_PATTERNS};
pub use fence::strip_code_fences;

/// Placeholder for a missing `micronutrients` field
pub const DEFAULT_MICRONUTRIENTS: &str = "Micronutrient details not available";
/// Placeholder for a missing `daily_summary` field
pub const DEFAULT_DAILY_SUMMARY: &str = "Daily summary not available";
/// Placeholder for a missing `recommendation` field
pub const DEFAULT_RECOMMENDATION: &str = "No specific recommendation available";

/// Normalization failure
#[derive(Debug, Clone, Error)]
pub enum NormalizationError {
    /// No parseable JSON in the reply
    #[error("Could not extract valid JSON from model reply")]
    Parse {
        /// Reply exactly as received
        raw: String,
    },
    /// JSON parsed but does not have the required shape
    #[error("Model reply has an invalid shape: {reason}")]
    Shape {
        /// Which check failed
        reason: String,
        /// The parsed value that failed validation
        parsed: Value,
        /// Reply exactly as received
        raw: String,
    },
}

/// Optional output fields selectable by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionField {
    /// `carbs` and `fats`, both required numbers when enabled
    Macros,
    /// `micronutrients` commentary string
    Micronutrients,
    /// `daily_summary` string
    DailySummary,
    /// `recommendation` string
    Recommendation,
}

impl ExtensionField {
    /// Every extension, in prompt order
    pub const ALL: [Self; 4] = [
        Self::Macros,
        Self::Micronutrients,
        Self::DailySummary,
        Self::Recommendation,
    ];

    /// Configuration name of this extension
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Macros => "macros",
            Self::Micronutrients => "micronutrients",
            Self::DailySummary => "daily_summary",
            Self::Recommendation => "recommendation",
        }
    }
}

impl FromStr for ExtensionField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "macros" => Ok(Self::Macros),
            "micronutrients" => Ok(Self::Micronutrients),
            "daily_summary" | "dailysummary" => Ok(Self::DailySummary),
            "recommendation" | "recommendations" => Ok(Self::Recommendation),
            other => Err(format!(
                "unknown response extension '{other}' (expected one of: macros, micronutrients, daily_summary, recommendation)"
            )),
        }
    }
}

impl fmt::Display for ExtensionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a reply reporting 0 kcal and 0 g protein
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ZeroEstimatePolicy {
    /// Return the zeros as-is
    Disabled,
    /// Replace only when the meal matches a known pattern
    #[default]
    KnownPatterns,
    /// Known patterns first, then this neutral estimate
    Neutral {
        /// Neutral calories (kcal)
        calories: f64,
        /// Neutral protein (g)
        protein: f64,
    },
}

impl ZeroEstimatePolicy {
    /// Neutral policy with the built-in defaults
    #[must_use]
    pub const fn neutral_default() -> Self {
        Self::Neutral {
            calories: nutrition::NEUTRAL_ESTIMATE_CALORIES,
            protein: nutrition::NEUTRAL_ESTIMATE_PROTEIN,
        }
    }

    /// Configuration name of this policy
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::KnownPatterns => "known_patterns",
            Self::Neutral { .. } => "neutral",
        }
    }
}

/// Normalizer configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizerConfig {
    /// Enabled optional fields, deduplicated
    pub extensions: Vec<ExtensionField>,
    /// Zero-estimate handling
    pub zero_estimate: ZeroEstimatePolicy,
}

impl NormalizerConfig {
    /// Enable an extension (no-op if already enabled)
    #[must_use]
    pub fn with_extension(mut self, field: ExtensionField) -> Self {
        if !self.extensions.contains(&field) {
            self.extensions.push(field);
        }
        self
    }

    /// Set the zero-estimate policy
    #[must_use]
    pub const fn with_zero_estimate(mut self, policy: ZeroEstimatePolicy) -> Self {
        self.zero_estimate = policy;
        self
    }

    /// Whether `field` is enabled
    #[must_use]
    pub fn has(&self, field: ExtensionField) -> bool {
        self.extensions.contains(&field)
    }
}

/// Turns raw model replies into validated [`NutritionRecord`]s
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    config: NormalizerConfig,
}

impl ResponseNormalizer {
    /// Create a normalizer
    #[must_use]
    pub const fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize one model reply for `query`
    ///
    /// # Errors
    ///
    /// - [`NormalizationError::Parse`] if no JSON value can be extracted
    /// - [`NormalizationError::Shape`] if the value is not an object or a
    ///   required field is not a number
    pub fn normalize(
        &self,
        raw: &str,
        query: &MealQuery,
    ) -> Result<NutritionRecord, NormalizationError> {
        let cleaned = strip_code_fences(raw);

        let Some(parsed) = extract_json(cleaned) else {
            warn!(reply_len = raw.len(), "No JSON found in model reply");
            return Err(NormalizationError::Parse {
                raw: raw.to_owned(),
            });
        };

        let mut fields = match parsed {
            Value::Object(fields) => fields,
            other => {
                return Err(shape_error("reply is not a JSON object", other, raw));
            }
        };

        self.fill_defaults(&mut fields);
        let record = self.validate_shape(fields, raw)?;
        debug!(
            calories = record.calories,
            protein = record.protein,
            "Model reply normalized"
        );

        Ok(apply_zero_estimate_fallback(
            record,
            &query.meal,
            &self.config.zero_estimate,
        ))
    }

    /// Substitute placeholders for enabled string fields that are absent or null
    fn fill_defaults(&self, fields: &mut Map<String, Value>) {
        let defaults = [
            (ExtensionField::Micronutrients, "micronutrients", DEFAULT_MICRONUTRIENTS),
            (ExtensionField::DailySummary, "daily_summary", DEFAULT_DAILY_SUMMARY),
            (ExtensionField::Recommendation, "recommendation", DEFAULT_RECOMMENDATION),
        ];

        for (field, key, placeholder) in defaults {
            if !self.config.has(field) {
                continue;
            }
            if matches!(fields.get(key), None | Some(Value::Null)) {
                fields.insert(key.to_owned(), Value::String(placeholder.to_owned()));
            }
        }
    }

    fn validate_shape(
        &self,
        fields: Map<String, Value>,
        raw: &str,
    ) -> Result<NutritionRecord, NormalizationError> {
        let mut required = vec!["calories", "protein"];
        if self.config.has(ExtensionField::Macros) {
            required.extend(["carbs", "fats"]);
        }

        if let Some(key) = required
            .iter()
            .find(|key| fields.get(**key).and_then(Value::as_f64).is_none())
        {
            let reason = format!("field `{key}` must be a number");
            return Err(shape_error(&reason, Value::Object(fields), raw));
        }

        let number = |key: &str| fields.get(key).and_then(Value::as_f64);
        let text = |field: ExtensionField, key: &str| {
            if self.config.has(field) {
                fields.get(key).map(render_text)
            } else {
                None
            }
        };

        Ok(NutritionRecord {
            calories: number("calories").unwrap_or_default(),
            protein: number("protein").unwrap_or_default(),
            carbs: number("carbs").filter(|_| self.config.has(ExtensionField::Macros)),
            fats: number("fats").filter(|_| self.config.has(ExtensionField::Macros)),
            micronutrients: text(ExtensionField::Micronutrients, "micronutrients"),
            daily_summary: text(ExtensionField::DailySummary, "daily_summary"),
            recommendation: text(ExtensionField::Recommendation, "recommendation"),
        })
    }
}

/// Strings as-is; anything else as compact JSON text
fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn shape_error(reason: &str, parsed: Value, raw: &str) -> NormalizationError {
    warn!(reason = %reason, "Model reply failed shape validation");
    NormalizationError::Shape {
        reason: reason.to_owned(),
        parsed,
        raw: raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(meal: &str) -> MealQuery {
        MealQuery::new(meal).unwrap()
    }

    #[test]
    fn test_numeric_fields_pass_through_unchanged() {
        let normalizer = ResponseNormalizer::default();
        let record = normalizer
            .normalize(r#"{"calories": 512.5, "protein": 31}"#, &query("pasta"))
            .unwrap();
        assert_eq!(record, NutritionRecord::new(512.5, 31.0));
    }

    #[test]
    fn test_numeric_string_is_a_shape_error() {
        let normalizer = ResponseNormalizer::default();
        let err = normalizer
            .normalize(r#"{"calories": "230", "protein": 14}"#, &query("toast"))
            .unwrap_err();
        match err {
            NormalizationError::Shape { reason, parsed, raw } => {
                assert!(reason.contains("calories"));
                assert_eq!(parsed["calories"], "230");
                assert!(raw.contains("\"230\""));
            }
            NormalizationError::Parse { .. } => panic!("expected shape error"),
        }
    }

    #[test]
    fn test_non_object_is_a_shape_error() {
        let normalizer = ResponseNormalizer::default();
        let err = normalizer.normalize("[1, 2]", &query("rice")).unwrap_err();
        assert!(matches!(err, NormalizationError::Shape { .. }));
    }

    #[test]
    fn test_string_extensions_are_defaulted() {
        let config = NormalizerConfig::default()
            .with_extension(ExtensionField::DailySummary)
            .with_extension(ExtensionField::Recommendation)
            .with_extension(ExtensionField::Micronutrients);
        let normalizer = ResponseNormalizer::new(config);

        let record = normalizer
            .normalize(
                r#"{"calories": 300, "protein": 12, "recommendation": null, "micronutrients": {"iron": "high"}}"#,
                &query("spinach omelette"),
            )
            .unwrap();

        assert_eq!(record.daily_summary.as_deref(), Some(DEFAULT_DAILY_SUMMARY));
        assert_eq!(record.recommendation.as_deref(), Some(DEFAULT_RECOMMENDATION));
        assert_eq!(record.micronutrients.as_deref(), Some(r#"{"iron":"high"}"#));
    }

    #[test]
    fn test_disabled_extensions_are_dropped() {
        let normalizer = ResponseNormalizer::default();
        let record = normalizer
            .normalize(
                r#"{"calories": 300, "protein": 12, "carbs": 40, "recommendation": "eat more fiber"}"#,
                &query("bagel"),
            )
            .unwrap();
        assert_eq!(record, NutritionRecord::new(300.0, 12.0));
    }

    #[test]
    fn test_macros_extension_requires_numbers() {
        let normalizer =
            ResponseNormalizer::new(NormalizerConfig::default().with_extension(ExtensionField::Macros));

        let record = normalizer
            .normalize(
                r#"{"calories": 450, "protein": 25, "carbs": 50, "fats": 15}"#,
                &query("burrito bowl"),
            )
            .unwrap();
        assert_eq!(record.carbs, Some(50.0));
        assert_eq!(record.fats, Some(15.0));

        let err = normalizer
            .normalize(r#"{"calories": 450, "protein": 25, "carbs": 50}"#, &query("burrito bowl"))
            .unwrap_err();
        assert!(err.to_string().contains("fats"));
    }

    #[test]
    fn test_extension_config_parsing() {
        assert_eq!("Macros".parse::<ExtensionField>(), Ok(ExtensionField::Macros));
        assert_eq!(
            " daily_summary ".parse::<ExtensionField>(),
            Ok(ExtensionField::DailySummary)
        );
        assert!("sodium".parse::<ExtensionField>().is_err());
    }
}
