// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn provenance_from_count() {
    assert_eq!(Provenance::from_other_agent_count(0), Provenance::Solo);
    assert_eq!(Provenance::from_other_agent_count(1), Provenance::Collaborative);
    assert_eq!(Provenance::from_other_agent_count(2), Provenance::Synthesis);
    assert_eq!(Provenance::from_other_agent_count(5), Provenance::Synthesis);
}

#[test]
fn validate_rejects_empty() {
    assert!(matches!(
        Insight::validate_content("   "),
        Err(InsightValidationError::Empty)
    ));
}

#[test]
fn validate_rejects_over_280_chars() {
    let content = "x".repeat(281);
    assert!(matches!(
        Insight::validate_content(&content),
        Err(InsightValidationError::TooLong { len: 281, max: 280 })
    ));
}

#[test]
fn validate_accepts_exactly_280_chars() {
    let content = "x".repeat(280);
    assert!(Insight::validate_content(&content).is_ok());
}
