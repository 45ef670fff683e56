pub mod amplify;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::schedule::{timestamp, Answers, RawAnswers};

pub use amplify::AmplifyStore;
pub use memory::MemoryStore;

/// Page size used when listing schedules
pub const SCHEDULE_LIST_LIMIT: usize = 200;
/// Upper bound on responses joined into one schedule
pub const RESPONSE_LIST_LIMIT: usize = 500;

/// Persisted schedule, as the store hands it back
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Option<String>>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Persisted participant response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: String,
    pub schedule_id: String,
    pub name: String,
    pub normalized_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "amplify::deserialize_aws_json")]
    pub answers: RawAnswers,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResponseRecord {
    /// Timestamp used to order responses, newest first
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.updated_at
            .or(self.created_at)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub title: String,
    pub description: Option<String>,
    pub candidates: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResponse {
    pub schedule_id: String,
    pub name: String,
    pub normalized_name: String,
    pub comment: Option<String>,
    pub answers: Answers,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Replacement fields for an existing response; `id` and `schedule_id` stay
#[derive(Debug, Clone)]
pub struct ResponseUpdate {
    pub id: String,
    pub schedule_id: String,
    pub name: String,
    pub normalized_name: String,
    pub comment: Option<String>,
    pub answers: Answers,
    pub updated_at: DateTime<Utc>,
}

/// Equality filter over responses
#[derive(Debug, Clone)]
pub struct ResponseFilter {
    pub schedule_id: String,
    pub normalized_name: Option<String>,
}

impl ResponseFilter {
    pub fn by_schedule(schedule_id: &str) -> Self {
        ResponseFilter {
            schedule_id: schedule_id.to_string(),
            normalized_name: None,
        }
    }

    pub fn by_participant(schedule_id: &str, normalized_name: &str) -> Self {
        ResponseFilter {
            schedule_id: schedule_id.to_string(),
            normalized_name: Some(normalized_name.to_string()),
        }
    }

    pub fn matches(&self, record: &ResponseRecord) -> bool {
        record.schedule_id == self.schedule_id
            && self
                .normalized_name
                .as_ref()
                .map_or(true, |name| record.normalized_name == *name)
    }
}

/// Record API over schedules and their responses
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_schedules(&self, limit: usize) -> Result<Vec<ScheduleRecord>, StoreError>;

    async fn get_schedule(&self, id: &str) -> Result<Option<ScheduleRecord>, StoreError>;

    async fn create_schedule(&self, schedule: NewSchedule) -> Result<ScheduleRecord, StoreError>;

    async fn list_responses(
        &self,
        filter: &ResponseFilter,
        limit: usize,
    ) -> Result<Vec<ResponseRecord>, StoreError>;

    async fn create_response(&self, response: NewResponse) -> Result<ResponseRecord, StoreError>;

    async fn update_response(&self, update: ResponseUpdate) -> Result<ResponseRecord, StoreError>;
}
