// ABOUTME: Zero-estimate fallback for model replies that report 0 kcal and 0 g protein
// ABOUTME: Applies a table of known meal patterns, then an optional neutral default estimate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Zero-Estimate Fallback
//!
//! Some models answer `{"calories": 0, "protein": 0}` for ordinary meals.
//! A reply like that is syntactically valid but nutritionally useless, so
//! the normalizer hands it to this module before returning.
//!
//! The pattern table is a patch for observed model failures, not nutrition
//! logic. Prefer the `neutral` policy or a better prompt over growing it.

use tracing::{debug, warn};

use super::ZeroEstimatePolicy;
use crate::models::NutritionRecord;

/// A meal text pattern with a fixed replacement estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownMealPattern {
    /// Lowercase keywords that must all appear in the meal text
    pub keywords: &'static [&'static str],
    /// Replacement calories (kcal)
    pub calories: f64,
    /// Replacement protein (g)
    pub protein: f64,
}

impl KnownMealPattern {
    /// Whether every keyword occurs in the (already lowercased) meal text
    #[must_use]
    pub fn matches(&self, meal_lowercase: &str) -> bool {
        self.keywords.iter().all(|kw| meal_lowercase.contains(kw))
    }
}

/// Known zero-estimate failures and their replacement values
///
/// Egg-and-bread meals are repeatedly estimated at zero by the upstream model.
pub const KNOWN_MEAL_PATTERNS: &[KnownMealPattern] = &[KnownMealPattern {
    keywords: &["egg", "bread"],
    calories: 230.0,
    protein: 14.0,
}];

/// Replace an all-zero estimate according to `policy`
///
/// Records with any non-zero core field, and blank meal texts, pass through
/// unchanged. Only `calories` and `protein` are ever replaced.
#[must_use]
pub fn apply_zero_estimate_fallback(
    mut record: NutritionRecord,
    meal: &str,
    policy: &ZeroEstimatePolicy,
) -> NutritionRecord {
    if !record.is_zero_estimate() || meal.trim().is_empty() {
        return record;
    }

    let replacement = match policy {
        ZeroEstimatePolicy::Disabled => None,
        ZeroEstimatePolicy::KnownPatterns => known_pattern_estimate(meal),
        ZeroEstimatePolicy::Neutral { calories, protein } => {
            known_pattern_estimate(meal).or(Some((*calories, *protein)))
        }
    };

    if let Some((calories, protein)) = replacement {
        debug!(meal = %meal, "Zero-estimate fallback matched");
        warn!(
            meal_len = meal.len(),
            calories,
            protein,
            policy = policy.as_str(),
            "Model returned a zero estimate; applying fallback values"
        );
        record.calories = calories;
        record.protein = protein;
    }

    record
}

fn known_pattern_estimate(meal: &str) -> Option<(f64, f64)> {
    let lowercase = meal.to_lowercase();
    KNOWN_MEAL_PATTERNS
        .iter()
        .find(|pattern| pattern.matches(&lowercase))
        .map(|pattern| (pattern.calories, pattern.protein))
}
