pub mod answers;
pub mod availability;
pub mod candidates;
pub mod timestamp;
pub mod types;

pub use answers::{normalize_answers, normalize_name, RawAnswers};
pub use availability::Availability;
pub use candidates::normalize_candidates;
pub use types::{Answers, CandidateSummary, ParticipantResponse, Schedule};

/// Counts answers per candidate, in candidate order
pub fn summarize(schedule: &Schedule) -> Vec<CandidateSummary> {
    schedule
        .candidates
        .iter()
        .map(|candidate| {
            let mut summary = CandidateSummary::new(candidate);
            for response in &schedule.responses {
                let answer = response.answers.get(candidate).copied().unwrap_or_default();
                summary.record(answer);
            }
            summary
        })
        .collect()
}
