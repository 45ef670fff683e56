use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::{Mutex, MutexGuard};

use super::{
    NewResponse, NewSchedule, ResponseFilter, ResponseRecord, ResponseUpdate, ScheduleRecord,
    Store,
};
use crate::error::StoreError;
use crate::schedule::answers::to_raw;

const ID_LENGTH: usize = 20;

#[derive(Default)]
struct Records {
    schedules: Vec<ScheduleRecord>,
    responses: Vec<ResponseRecord>,
}

/// In-process record store; contents are lost on restart
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn new_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_schedules(&self, limit: usize) -> Result<Vec<ScheduleRecord>, StoreError> {
        let records = self.records()?;
        Ok(records.schedules.iter().take(limit).cloned().collect())
    }

    async fn get_schedule(&self, id: &str) -> Result<Option<ScheduleRecord>, StoreError> {
        let records = self.records()?;
        Ok(records.schedules.iter().find(|s| s.id == id).cloned())
    }

    async fn create_schedule(&self, schedule: NewSchedule) -> Result<ScheduleRecord, StoreError> {
        let record = ScheduleRecord {
            id: new_id(),
            title: schedule.title,
            description: schedule.description,
            candidates: schedule.candidates.into_iter().map(Some).collect(),
            created_at: Some(schedule.created_at),
            updated_at: Some(schedule.updated_at),
        };
        self.records()?.schedules.push(record.clone());
        Ok(record)
    }

    async fn list_responses(
        &self,
        filter: &ResponseFilter,
        limit: usize,
    ) -> Result<Vec<ResponseRecord>, StoreError> {
        let records = self.records()?;
        Ok(records
            .responses
            .iter()
            .filter(|r| filter.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_response(&self, response: NewResponse) -> Result<ResponseRecord, StoreError> {
        let record = ResponseRecord {
            id: new_id(),
            schedule_id: response.schedule_id,
            name: response.name,
            normalized_name: response.normalized_name,
            comment: response.comment,
            answers: to_raw(&response.answers),
            created_at: Some(response.created_at),
            updated_at: Some(response.updated_at),
        };
        self.records()?.responses.push(record.clone());
        Ok(record)
    }

    async fn update_response(&self, update: ResponseUpdate) -> Result<ResponseRecord, StoreError> {
        let mut records = self.records()?;
        let record = records
            .responses
            .iter_mut()
            .find(|r| r.id == update.id)
            .ok_or_else(|| StoreError::UnknownRecord {
                kind: "ParticipantResponse",
                id: update.id.clone(),
            })?;

        record.schedule_id = update.schedule_id;
        record.name = update.name;
        record.normalized_name = update.normalized_name;
        record.comment = update.comment;
        record.answers = to_raw(&update.answers);
        record.updated_at = Some(update.updated_at);
        Ok(record.clone())
    }
}
