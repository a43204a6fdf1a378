// ABOUTME: Meal query and nutrition record models shared by routes, prompts, and the normalizer
// ABOUTME: Enforces a non-empty meal description at construction and numeric calories/protein on output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Analysis Models
//!
//! - [`MealQuery`]: one inbound analysis request (meal text plus optional context)
//! - [`NutritionRecord`]: the validated estimate returned to callers

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Optional user context sent alongside a meal description
///
/// Free-form history fields stay as raw JSON: they are only ever rendered
/// into the prompt, never interpreted. Every field is lenient: a value of
/// the wrong type is dropped (or wrapped) rather than failing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealContext {
    /// Dietary goal (e.g. "lose weight", "build muscle")
    #[serde(default, deserialize_with = "lenient_text")]
    pub goal: Option<String>,
    /// Daily calorie target; numeric strings are accepted
    #[serde(default, deserialize_with = "lenient_number")]
    pub target_calories: Option<f64>,
    /// Activity level (e.g. "sedentary", "very active")
    #[serde(default, deserialize_with = "lenient_text")]
    pub activity_level: Option<String>,
    /// Meals already logged today
    #[serde(default, deserialize_with = "lenient_list")]
    pub previous_meals: Vec<Value>,
    /// Weight history entries
    #[serde(default, deserialize_with = "lenient_list")]
    pub weight_data: Vec<Value>,
}

/// Strings as-is, numbers and booleans as their text, anything else dropped
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        scalar @ (Value::Number(_) | Value::Bool(_)) => Some(scalar.to_string()),
        other => {
            debug!(value = %other, "Ignoring non-text context field");
            None
        }
    })
}

/// Numbers as-is, numeric strings parsed, anything else dropped
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite());

    if number.is_none() {
        debug!(value = %value, "Ignoring non-numeric context field");
    }
    Ok(number)
}

/// Arrays as-is, `null` as empty, a lone value as a one-element list
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        single => {
            debug!("Wrapping non-list context field in a list");
            vec![single]
        }
    })
}

/// Integral values as JSON integers so `230` round-trips as `230`, not `230.0`
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if is_exact_integer(*value) {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[allow(clippy::ref_option)]
fn serialize_optional_number<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(number) => serialize_number(number, serializer),
        None => serializer.serialize_none(),
    }
}

fn is_exact_integer(value: f64) -> bool {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    value.is_finite() && value.abs() <= MAX_SAFE_INTEGER && value.fract() == 0.0
}

impl MealContext {
    /// Whether any context field carries information
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.goal.is_none()
            && self.target_calories.is_none()
            && self.activity_level.is_none()
            && self.previous_meals.is_empty()
            && self.weight_data.is_empty()
    }
}

/// Wire format of `POST /api/analyze-meal`
///
/// `meal` is optional here so a missing field maps to a 400 with our own
/// payload instead of the framework's rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeMealRequest {
    /// Meal description
    #[serde(default)]
    pub meal: Option<String>,
    /// Everything else in the body
    #[serde(flatten)]
    pub context: MealContext,
}

/// A validated meal analysis request
#[derive(Debug, Clone, PartialEq)]
pub struct MealQuery {
    /// Meal description, never blank
    pub meal: String,
    /// Optional user context
    pub context: MealContext,
}

impl MealQuery {
    /// Create a query without context
    ///
    /// # Errors
    ///
    /// Returns a `MISSING_REQUIRED_FIELD` error if `meal` is blank.
    pub fn new(meal: impl Into<String>) -> AppResult<Self> {
        Self::with_context(meal, MealContext::default())
    }

    /// Create a query with context
    ///
    /// # Errors
    ///
    /// Returns a `MISSING_REQUIRED_FIELD` error if `meal` is blank.
    pub fn with_context(meal: impl Into<String>, context: MealContext) -> AppResult<Self> {
        let meal = meal.into();
        if meal.trim().is_empty() {
            return Err(AppError::missing_field("Meal description is required"));
        }
        Ok(Self { meal, context })
    }
}

impl TryFrom<AnalyzeMealRequest> for MealQuery {
    type Error = AppError;

    fn try_from(request: AnalyzeMealRequest) -> AppResult<Self> {
        let meal = request
            .meal
            .ok_or_else(|| AppError::missing_field("Meal description is required"))?;
        Self::with_context(meal, request.context)
    }
}

/// Validated nutrition estimate
///
/// `calories` and `protein` are always numbers. Whole numbers serialize as
/// JSON integers. Extension fields are present exactly when their extension
/// is enabled in the normalizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    /// Energy in kcal
    #[serde(serialize_with = "serialize_number")]
    pub calories: f64,
    /// Protein in grams
    #[serde(serialize_with = "serialize_number")]
    pub protein: f64,
    /// Carbohydrates in grams
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_number"
    )]
    pub carbs: Option<f64>,
    /// Fats in grams
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_number"
    )]
    pub fats: Option<f64>,
    /// Micronutrient commentary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micronutrients: Option<String>,
    /// Summary of the day so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_summary: Option<String>,
    /// Dietary recommendation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl NutritionRecord {
    /// Record with only the core fields
    #[must_use]
    pub const fn new(calories: f64, protein: f64) -> Self {
        Self {
            calories,
            protein,
            carbs: None,
            fats: None,
            micronutrients: None,
            daily_summary: None,
            recommendation: None,
        }
    }

    /// Whether the model reported zero for both core fields
    #[must_use]
    pub fn is_zero_estimate(&self) -> bool {
        self.calories.abs() < f64::EPSILON && self.protein.abs() < f64::EPSILON
    }
}
