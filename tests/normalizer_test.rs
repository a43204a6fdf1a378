// ABOUTME: Integration tests for the response normalizer pipeline
// ABOUTME: Covers fenced, prose-wrapped, malformed, and mis-typed model replies end to end
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use meal_analysis_server::{
    models::{MealQuery, NutritionRecord},
    normalizer::{
        strip_code_fences, ExtensionField, NormalizationError, NormalizerConfig,
        ResponseNormalizer, ZeroEstimatePolicy, DEFAULT_DAILY_SUMMARY, DEFAULT_MICRONUTRIENTS,
        DEFAULT_RECOMMENDATION,
    },
};

fn normalize(raw: &str, meal: &str) -> Result<NutritionRecord, NormalizationError> {
    ResponseNormalizer::default().normalize(raw, &MealQuery::new(meal).unwrap())
}

#[test]
fn test_well_formed_replies_pass_through() {
    for (raw, calories, protein) in [
        (r#"{"calories": 0.5, "protein": 0}"#, 0.5, 0.0),
        (r#"{"calories": 1200, "protein": 85.25}"#, 1200.0, 85.25),
        (r#"{"protein": 3, "calories": 77, "note": "ignored"}"#, 77.0, 3.0),
    ] {
        let record = normalize(raw, "anything").unwrap();
        assert_eq!(record, NutritionRecord::new(calories, protein), "reply: {raw}");
    }
}

#[test]
fn test_fenced_reply_matches_unfenced() {
    let plain = r#"{"calories": 640, "protein": 27}"#;
    let fenced = format!("```json\n{plain}\n```");
    let untagged = format!("```\n{plain}\n```");

    let expected = normalize(plain, "ramen").unwrap();
    assert_eq!(normalize(&fenced, "ramen").unwrap(), expected);
    assert_eq!(normalize(&untagged, "ramen").unwrap(), expected);
}

#[test]
fn test_fence_stripping_is_idempotent() {
    for raw in [
        "```json\n{\"a\": 1}\n```",
        "{\"a\": 1}",
        "  prose only  ",
        "```\n```",
    ] {
        let once = strip_code_fences(raw);
        assert_eq!(strip_code_fences(once), once, "input: {raw:?}");
    }
}

#[test]
fn test_prose_then_object_extracts_only_the_object() {
    let raw = "Based on typical portions, here is my estimate:\n{\"calories\": 850, \"protein\": 45}\nLet me know if you need more.";
    assert_eq!(
        normalize(raw, "pizza").unwrap(),
        NutritionRecord::new(850.0, 45.0)
    );
}

#[test]
fn test_string_calories_is_shape_error_not_coerced() {
    let raw = r#"{"calories": "850", "protein": 45}"#;
    match normalize(raw, "pizza").unwrap_err() {
        NormalizationError::Shape { parsed, raw: echoed, .. } => {
            assert_eq!(parsed["calories"], "850");
            assert_eq!(echoed, raw);
        }
        NormalizationError::Parse { .. } => panic!("expected a shape error"),
    }
}

#[test]
fn test_missing_protein_is_shape_error() {
    let err = normalize(r#"{"calories": 500}"#, "pizza").unwrap_err();
    assert!(matches!(err, NormalizationError::Shape { .. }));
}

#[test]
fn test_no_json_is_parse_error_with_raw_text() {
    let raw = "Roughly 500 kcal and 20 g of protein.";
    match normalize(raw, "burger").unwrap_err() {
        NormalizationError::Parse { raw: echoed } => assert_eq!(echoed, raw),
        NormalizationError::Shape { .. } => panic!("expected a parse error"),
    }
}

#[test]
fn test_unbalanced_braces_is_parse_error() {
    let err = normalize("{\"calories\": 500, \"protein\": 20", "burger").unwrap_err();
    assert!(matches!(err, NormalizationError::Parse { .. }));
}

#[test]
fn test_egg_and_bread_zero_override() {
    let record = normalize(r#"{"calories":0,"protein":0}"#, "2 eggs and wheat bread").unwrap();
    assert_eq!(record, NutritionRecord::new(230.0, 14.0));
}

#[test]
fn test_zero_estimate_for_other_meals_depends_on_policy() {
    let query = MealQuery::new("green salad").unwrap();
    let raw = r#"{"calories":0,"protein":0}"#;

    let default_policy = ResponseNormalizer::default().normalize(raw, &query).unwrap();
    assert!(default_policy.is_zero_estimate());

    let neutral = ResponseNormalizer::new(
        NormalizerConfig::default().with_zero_estimate(ZeroEstimatePolicy::neutral_default()),
    )
    .normalize(raw, &query)
    .unwrap();
    assert_eq!(neutral, NutritionRecord::new(400.0, 20.0));
}

#[test]
fn test_all_string_extensions_are_defaulted() {
    let normalizer = ResponseNormalizer::new(
        NormalizerConfig::default()
            .with_extension(ExtensionField::Micronutrients)
            .with_extension(ExtensionField::DailySummary)
            .with_extension(ExtensionField::Recommendation),
    );

    let record = normalizer
        .normalize(
            r#"{"calories": 250, "protein": 9}"#,
            &MealQuery::new("porridge").unwrap(),
        )
        .unwrap();

    assert_eq!(record.micronutrients.as_deref(), Some(DEFAULT_MICRONUTRIENTS));
    assert_eq!(record.daily_summary.as_deref(), Some(DEFAULT_DAILY_SUMMARY));
    assert_eq!(record.recommendation.as_deref(), Some(DEFAULT_RECOMMENDATION));
}
