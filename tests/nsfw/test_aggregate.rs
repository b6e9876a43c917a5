// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Score aggregation tests

use imgscan::{aggregate_score, exceeds_threshold, Detection, Label, NSFW_THRESHOLD};

fn det(label: &str, score: f32) -> Detection {
    Detection::new(label.parse::<Label>().unwrap(), score)
}

#[test]
fn test_two_halves_combine_to_threshold() {
    let score = aggregate_score(&[
        det("FEMALE_BREAST_EXPOSED", 0.5),
        det("ANUS_EXPOSED", 0.5),
    ]);
    assert_eq!(score, 1.0 - (1.0 - 0.5) * (1.0 - 0.5));
    assert_eq!(score, 0.75);
    assert!(exceeds_threshold(score));
}

#[test]
fn test_non_exposed_class_contributes_nothing() {
    assert_eq!(aggregate_score(&[det("FACE_FEMALE", 0.99)]), 0.0);
    assert_eq!(
        aggregate_score(&[
            det("FACE_FEMALE", 0.99),
            det("FEMALE_BREAST_COVERED", 0.99),
            det("BUTTOCKS_EXPOSED", 0.3),
        ]),
        f64::from(0.3f32)
    );
}

#[test]
fn test_threshold_is_inclusive() {
    assert_eq!(NSFW_THRESHOLD, 0.75);
    assert!(exceeds_threshold(0.75));
    assert!(!exceeds_threshold(0.7499));
    assert!(!exceeds_threshold(0.749_999_999));
}

#[test]
fn test_order_does_not_matter() {
    let forward = [
        det("BUTTOCKS_EXPOSED", 0.2),
        det("MALE_GENITALIA_EXPOSED", 0.35),
        det("FEMALE_GENITALIA_EXPOSED", 0.6),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = aggregate_score(&forward);
    let b = aggregate_score(&reversed);
    assert!((a - b).abs() < 1e-12);
}

#[test]
fn test_all_exposed_classes_count() {
    for name in [
        "BUTTOCKS_EXPOSED",
        "FEMALE_BREAST_EXPOSED",
        "FEMALE_GENITALIA_EXPOSED",
        "ANUS_EXPOSED",
        "MALE_GENITALIA_EXPOSED",
    ] {
        assert_eq!(aggregate_score(&[det(name, 0.5)]), 0.5, "{}", name);
    }
}
