// ABOUTME: Prompt construction for meal analysis requests sent to the upstream model
// ABOUTME: Builds the nutrition-expert system prompt and the user prompt with optional context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Meal Analysis Prompts
//!
//! The base system prompt is loaded at compile time from `nutrition_system.md`.
//! Each enabled response extension appends one instruction line so the model
//! knows which extra fields the normalizer will require.

use std::fmt::Write as _;

use super::{ChatMessage, ChatRequest};
use crate::models::{MealContext, MealQuery};
use crate::normalizer::{ExtensionField, NormalizerConfig};

/// Nutrition expert system prompt
pub const NUTRITION_SYSTEM_PROMPT: &str = include_str!("nutrition_system.md");

/// Opening of every user prompt; the meal text follows it
pub const USER_PROMPT_PREFIX: &str = "Analyze this meal and estimate calories and protein: ";

const fn extension_instruction(field: ExtensionField) -> &'static str {
    match field {
        ExtensionField::Macros => {
            "Also include 'carbs' and 'fats' fields in grams, both as numbers."
        }
        ExtensionField::Micronutrients => {
            "Also include a 'micronutrients' field: a short string describing notable vitamins and minerals."
        }
        ExtensionField::DailySummary => {
            "Also include a 'daily_summary' field: a short string summarizing the day's intake including this meal."
        }
        ExtensionField::Recommendation => {
            "Also include a 'recommendation' field: a short string with one dietary suggestion for the user."
        }
    }
}

/// System prompt for the given normalizer configuration
#[must_use]
pub fn build_system_prompt(config: &NormalizerConfig) -> String {
    let mut prompt = NUTRITION_SYSTEM_PROMPT.trim_end().to_owned();
    for field in ExtensionField::ALL {
        if config.has(field) {
            prompt.push('\n');
            prompt.push_str(extension_instruction(field));
        }
    }
    prompt
}

/// User prompt carrying the meal text and any supplied context
#[must_use]
pub fn build_user_prompt(query: &MealQuery) -> String {
    let mut prompt = format!("{USER_PROMPT_PREFIX}{}", query.meal);
    if !query.context.is_empty() {
        prompt.push_str("\n\nUser context:");
        append_context(&mut prompt, &query.context);
    }
    prompt
}

fn append_context(prompt: &mut String, context: &MealContext) {
    // Writing to a String cannot fail
    if let Some(goal) = &context.goal {
        let _ = write!(prompt, "\n- Goal: {goal}");
    }
    if let Some(target) = context.target_calories {
        let _ = write!(prompt, "\n- Daily calorie target: {target} kcal");
    }
    if let Some(level) = &context.activity_level {
        let _ = write!(prompt, "\n- Activity level: {level}");
    }
    if !context.previous_meals.is_empty() {
        let meals = serde_json::to_string(&context.previous_meals).unwrap_or_default();
        let _ = write!(prompt, "\n- Meals already logged today: {meals}");
    }
    if !context.weight_data.is_empty() {
        let weights = serde_json::to_string(&context.weight_data).unwrap_or_default();
        let _ = write!(prompt, "\n- Weight history: {weights}");
    }
}

/// System + user messages for one meal analysis
#[must_use]
pub fn build_chat_request(query: &MealQuery, config: &NormalizerConfig) -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::system(build_system_prompt(config)),
        ChatMessage::user(build_user_prompt(query)),
    ])
}
