use tracing::warn;

use super::super::domain::{Alternative, AlternativeId};
use super::super::validation::{validate_multiple_choice_limit, MAX_SELECTIONS};

pub const ALTERNATIVE_VALUE_MAX: i32 = 100;
pub const MULTIPLE_CHOICE_CAP: u32 = 50;
pub const OPEN_TEXT_SHORT_SCORE: u32 = 5;
pub const OPEN_TEXT_MEDIUM_SCORE: u32 = 8;
pub const OPEN_TEXT_FULL_SCORE: u32 = 10;

const OPEN_TEXT_MIN_CHARS: usize = 10;
const OPEN_TEXT_MEDIUM_CHARS: usize = 50;
const OPEN_TEXT_FULL_CHARS: usize = 100;

fn alternative_value(id: &AlternativeId, alternatives: &[Alternative]) -> Option<u32> {
    let alternative = alternatives.iter().find(|alternative| &alternative.id == id)?;
    if (0..=ALTERNATIVE_VALUE_MAX).contains(&alternative.value) {
        u32::try_from(alternative.value).ok()
    } else {
        warn!(
            alternative_id = %id,
            value = alternative.value,
            "alternative value outside 0..=100, scoring as zero"
        );
        None
    }
}

pub(crate) fn single_choice(id: &AlternativeId, alternatives: &[Alternative]) -> u32 {
    alternative_value(id, alternatives).unwrap_or(0)
}

pub(crate) fn multiple_choice(ids: &[AlternativeId], alternatives: &[Alternative]) -> u32 {
    if let Err(reason) = validate_multiple_choice_limit(ids, MAX_SELECTIONS) {
        warn!(%reason, "invalid multiple choice selection, scoring as zero");
        return 0;
    }

    let total: u32 = ids
        .iter()
        .map(|id| alternative_value(id, alternatives).unwrap_or(0))
        .sum();

    total.min(MULTIPLE_CHOICE_CAP)
}

/// Coarse quality tiers by trimmed length.
pub(crate) fn open_text(text: &str) -> u32 {
    let length = text.trim().chars().count();
    if length < OPEN_TEXT_MIN_CHARS {
        0
    } else if length < OPEN_TEXT_MEDIUM_CHARS {
        OPEN_TEXT_SHORT_SCORE
    } else if length < OPEN_TEXT_FULL_CHARS {
        OPEN_TEXT_MEDIUM_SCORE
    } else {
        OPEN_TEXT_FULL_SCORE
    }
}
