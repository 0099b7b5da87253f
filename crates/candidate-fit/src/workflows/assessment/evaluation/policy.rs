use super::super::domain::FitLabel;

pub const HIGHEST_FIT_THRESHOLD: u32 = 80;
pub const APPROVED_FIT_THRESHOLD: u32 = 60;
pub const QUESTIONABLE_FIT_THRESHOLD: u32 = 40;

/// Map an aggregate fit score onto its qualitative band.
pub fn classify(score: u32) -> FitLabel {
    if score >= HIGHEST_FIT_THRESHOLD {
        FitLabel::HighestFit
    } else if score >= APPROVED_FIT_THRESHOLD {
        FitLabel::ApprovedFit
    } else if score >= QUESTIONABLE_FIT_THRESHOLD {
        FitLabel::QuestionableFit
    } else {
        FitLabel::OutOfProfile
    }
}
