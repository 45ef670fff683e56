use serde_json::{Map, Value};

use super::availability::Availability;
use super::types::Answers;

/// Untyped answers as submitted by a client or read back from the store
pub type RawAnswers = Map<String, Value>;

/// Lower-cased, trimmed participant name used as the per-schedule key
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Builds one answer per candidate from untyped input
///
/// Keys that are not current candidates are dropped, candidates without a
/// recognized literal fall back to unavailable.
pub fn normalize_answers(candidates: &[String], submitted: &RawAnswers) -> Answers {
    candidates
        .iter()
        .map(|candidate| {
            let answer = Availability::from_json(submitted.get(candidate));
            (candidate.clone(), answer)
        })
        .collect()
}

/// Converts typed answers back to the JSON object stored per response
pub fn to_raw(answers: &Answers) -> RawAnswers {
    answers
        .iter()
        .map(|(candidate, answer)| (candidate.clone(), Value::String(answer.as_str().to_string())))
        .collect()
}
