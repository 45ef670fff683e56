use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use super::{
    NewResponse, NewSchedule, ResponseFilter, ResponseRecord, ResponseUpdate, ScheduleRecord,
    Store,
};
use crate::config::AmplifySettings;
use crate::error::StoreError;
use crate::schedule::{timestamp, RawAnswers};

const SCHEDULE_FIELDS: &str = "id title description candidates createdAt updatedAt";
const RESPONSE_FIELDS: &str =
    "id scheduleId name normalizedName comment answers createdAt updatedAt";

/// Amplify Data (AppSync GraphQL) client authenticated with the shared API key
pub struct AmplifyStore {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct Connection<T> {
    items: Option<Vec<Option<T>>>,
}

impl<T> Connection<T> {
    fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default().into_iter().flatten().collect()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSchedulesData {
    list_schedules: Option<Connection<ScheduleRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetScheduleData {
    get_schedule: Option<ScheduleRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateScheduleData {
    create_schedule: Option<ScheduleRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponsesData {
    list_participant_responses: Option<Connection<ResponseRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateResponseData {
    create_participant_response: Option<ResponseRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponseData {
    update_participant_response: Option<ResponseRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateScheduleInput<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    candidates: &'a [String],
    created_at: String,
    updated_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    schedule_id: &'a str,
    name: &'a str,
    normalized_name: &'a str,
    comment: Option<&'a str>,
    // AWSJSON scalars travel as encoded strings
    answers: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    updated_at: String,
}

/// Accepts `answers` either as an AWSJSON string or as an inline object
pub fn deserialize_aws_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RawAnswers, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::String(encoded) => {
            serde_json::from_str::<Value>(&encoded).map_err(serde::de::Error::custom)?
        }
        other => other,
    };
    Ok(match parsed {
        Value::Object(map) => map,
        _ => RawAnswers::new(),
    })
}

impl AmplifyStore {
    pub fn connect(settings: &AmplifySettings) -> Result<AmplifyStore, StoreError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        debug!(
            "Amplify Data client for {} ({}, {})",
            settings.endpoint, settings.region, settings.auth_mode
        );
        Ok(AmplifyStore {
            http,
            endpoint: settings.endpoint.trim().to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Runs one GraphQL operation; any `errors[]` entry fails the call
    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, StoreError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope: GraphQlResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(StoreError::Remote(format!("Amplify Data responded with {status}")));
            }
            Err(err) => return Err(StoreError::Decode(err)),
        };

        let errors = envelope.errors.unwrap_or_default();
        if !errors.is_empty() {
            return Err(StoreError::from_messages(errors.into_iter().map(|e| e.message)));
        }
        envelope.data.ok_or(StoreError::NoResult)
    }
}

fn response_filter(filter: &ResponseFilter) -> Value {
    let mut conditions = serde_json::Map::new();
    conditions.insert("scheduleId".to_string(), json!({ "eq": filter.schedule_id }));
    if let Some(name) = &filter.normalized_name {
        conditions.insert("normalizedName".to_string(), json!({ "eq": name }));
    }
    Value::Object(conditions)
}

#[async_trait]
impl Store for AmplifyStore {
    async fn list_schedules(&self, limit: usize) -> Result<Vec<ScheduleRecord>, StoreError> {
        let query = format!(
            "query ListSchedules($limit: Int) {{ listSchedules(limit: $limit) {{ items {{ {SCHEDULE_FIELDS} }} }} }}"
        );
        let data: ListSchedulesData = self.execute(&query, json!({ "limit": limit })).await?;
        Ok(data.list_schedules.map(Connection::into_items).unwrap_or_default())
    }

    async fn get_schedule(&self, id: &str) -> Result<Option<ScheduleRecord>, StoreError> {
        let query =
            format!("query GetSchedule($id: ID!) {{ getSchedule(id: $id) {{ {SCHEDULE_FIELDS} }} }}");
        let data: GetScheduleData = self.execute(&query, json!({ "id": id })).await?;
        Ok(data.get_schedule)
    }

    async fn create_schedule(&self, schedule: NewSchedule) -> Result<ScheduleRecord, StoreError> {
        let query = format!(
            "mutation CreateSchedule($input: CreateScheduleInput!) {{ createSchedule(input: $input) {{ {SCHEDULE_FIELDS} }} }}"
        );
        let input = CreateScheduleInput {
            title: &schedule.title,
            description: schedule.description.as_deref(),
            candidates: &schedule.candidates,
            created_at: timestamp::format(&schedule.created_at),
            updated_at: timestamp::format(&schedule.updated_at),
        };
        let data: CreateScheduleData = self.execute(&query, json!({ "input": input })).await?;
        data.create_schedule.ok_or(StoreError::NoResult)
    }

    async fn list_responses(
        &self,
        filter: &ResponseFilter,
        limit: usize,
    ) -> Result<Vec<ResponseRecord>, StoreError> {
        let query = format!(
            "query ListParticipantResponses($filter: ModelParticipantResponseFilterInput, $limit: Int) \
             {{ listParticipantResponses(filter: $filter, limit: $limit) {{ items {{ {RESPONSE_FIELDS} }} }} }}"
        );
        let variables = json!({ "filter": response_filter(filter), "limit": limit });
        let data: ListResponsesData = self.execute(&query, variables).await?;
        Ok(data
            .list_participant_responses
            .map(Connection::into_items)
            .unwrap_or_default())
    }

    async fn create_response(&self, response: NewResponse) -> Result<ResponseRecord, StoreError> {
        let query = format!(
            "mutation CreateParticipantResponse($input: CreateParticipantResponseInput!) \
             {{ createParticipantResponse(input: $input) {{ {RESPONSE_FIELDS} }} }}"
        );
        let input = ResponseInput {
            id: None,
            schedule_id: &response.schedule_id,
            name: &response.name,
            normalized_name: &response.normalized_name,
            comment: response.comment.as_deref(),
            answers: serde_json::to_string(&response.answers)?,
            created_at: Some(timestamp::format(&response.created_at)),
            updated_at: timestamp::format(&response.updated_at),
        };
        let data: CreateResponseData = self.execute(&query, json!({ "input": input })).await?;
        data.create_participant_response.ok_or(StoreError::NoResult)
    }

    async fn update_response(&self, update: ResponseUpdate) -> Result<ResponseRecord, StoreError> {
        let query = format!(
            "mutation UpdateParticipantResponse($input: UpdateParticipantResponseInput!) \
             {{ updateParticipantResponse(input: $input) {{ {RESPONSE_FIELDS} }} }}"
        );
        let input = ResponseInput {
            id: Some(&update.id),
            schedule_id: &update.schedule_id,
            name: &update.name,
            normalized_name: &update.normalized_name,
            comment: update.comment.as_deref(),
            answers: serde_json::to_string(&update.answers)?,
            created_at: None,
            updated_at: timestamp::format(&update.updated_at),
        };
        let data: UpdateResponseData = self.execute(&query, json!({ "input": input })).await?;
        data.update_participant_response.ok_or(StoreError::NoResult)
    }
}
