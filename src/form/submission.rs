use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ServiceError;
use crate::schedule::{normalize_candidates, normalize_name, RawAnswers};

/// Body of `POST /schedules`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSchedulePayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<String>,
}

/// Body of `POST /schedules/{id}/responses`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    // Keys are checked against the schedule's candidates later
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: RawAnswers,
}

/// Reads an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A create request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub title: String,
    pub description: Option<String>,
    pub candidates: Vec<String>,
}

/// A response submission that passed validation; answers are still untyped
#[derive(Debug, Clone)]
pub struct ResponseDraft {
    pub name: String,
    pub normalized_name: String,
    pub comment: Option<String>,
    pub answers: RawAnswers,
}

/// Trims an optional text field, treating blank as absent
fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl CreateSchedulePayload {
    pub fn validate(&self) -> Result<ScheduleDraft, ServiceError> {
        let title = trimmed(self.title.as_deref()).ok_or(ServiceError::MissingTitle)?;

        let candidates = normalize_candidates(&self.candidates)?;
        if candidates.is_empty() {
            return Err(ServiceError::NoCandidates);
        }

        Ok(ScheduleDraft {
            title,
            description: trimmed(self.description.as_deref()),
            candidates,
        })
    }
}

impl ResponsePayload {
    pub fn validate(&self) -> Result<ResponseDraft, ServiceError> {
        let name = trimmed(self.name.as_deref()).ok_or(ServiceError::MissingName)?;

        Ok(ResponseDraft {
            normalized_name: normalize_name(&name),
            name,
            comment: trimmed(self.comment.as_deref()),
            answers: self.answers.clone(),
        })
    }
}
