//! Property tests for progress evaluation and code minting.

use std::collections::HashSet;

use academic_records::identity::{is_valid_code, mint_code};
use academic_records::{CourseCatalog, CourseDefinition, LearnerRecord, ProgressEvaluator};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

fn catalog_with(module_count: usize) -> CourseCatalog {
    let mut catalog = CourseCatalog::in_memory();
    catalog.insert(CourseDefinition::new("1", "Curso", "10h", "admin"));
    for i in 0..module_count {
        catalog.add_module("1", &format!("M{i}"), "admin").unwrap();
    }
    catalog
}

fn learner_with(done: impl IntoIterator<Item = String>) -> LearnerRecord {
    let mut learner = LearnerRecord::new("Ana");
    learner.enrolled.push("1".to_string());
    learner
        .completed_modules
        .insert("1".to_string(), done.into_iter().collect());
    learner
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_zero_module_course_is_zero(done in prop::collection::vec("[A-Z]{1,4}", 0..8)) {
        let catalog = catalog_with(0);
        let evaluator = ProgressEvaluator::new(&catalog);
        let fraction = evaluator.completion_fraction(&learner_with(done), "1").unwrap();
        prop_assert_eq!(fraction, 0.0);
    }

    #[test]
    fn prop_complete_iff_fraction_is_one(total in 0usize..12, done_mask in any::<u16>()) {
        let catalog = catalog_with(total);
        let done = (0..total)
            .filter(|i| done_mask & (1 << i) != 0)
            .map(|i| format!("M{i}"));
        let learner = learner_with(done);
        let evaluator = ProgressEvaluator::new(&catalog);

        let fraction = evaluator.completion_fraction(&learner, "1").unwrap();
        prop_assert!((0.0..=1.0).contains(&fraction));
        prop_assert_eq!(evaluator.is_complete(&learner, "1").unwrap(), fraction == 1.0);
    }

    #[test]
    fn prop_minted_codes_are_well_formed(
        learner in "\\PC{0,24}",
        course in "\\PC{0,24}",
        nanos in 0i64..4_000_000_000_000_000_000,
    ) {
        let code = mint_code(&learner, &course, Utc.timestamp_nanos(nanos));
        prop_assert!(is_valid_code(&code), "bad code {}", code);
    }
}

#[test]
fn test_ten_thousand_codes_are_distinct() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    let codes: HashSet<String> = (0..10_000)
        .map(|i| mint_code("Ana", "Introdução à Programação", start + Duration::microseconds(i)))
        .collect();
    assert_eq!(codes.len(), 10_000);
}
