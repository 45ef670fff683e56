use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::availability::Availability;

/// Candidate literal -> answer, one entry per schedule candidate
pub type Answers = BTreeMap<String, Availability>;

/// A poll as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub candidates: Vec<String>, // normalized ISO literals, creator's order
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub responses: Vec<ParticipantResponse>,
}

/// One participant's answers, as returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub answers: Answers,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Tally of answers for a single candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub candidate: String,
    pub available: u32,
    pub maybe: u32,
    pub unavailable: u32,
}

impl CandidateSummary {
    pub fn new(candidate: &str) -> Self {
        CandidateSummary {
            candidate: candidate.to_string(),
            available: 0,
            maybe: 0,
            unavailable: 0,
        }
    }

    pub fn record(&mut self, answer: Availability) {
        match answer {
            Availability::Available => self.available += 1,
            Availability::Maybe => self.maybe += 1,
            Availability::Unavailable => self.unavailable += 1,
        }
    }
}
