use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use crate::error::ServiceError;
use crate::form::{CreateSchedulePayload, ResponsePayload};
use crate::schedule::{
    normalize_answers, summarize, CandidateSummary, ParticipantResponse, Schedule,
};
use crate::store::{
    NewResponse, NewSchedule, ResponseFilter, ResponseRecord, ResponseUpdate, ScheduleRecord,
    Store, RESPONSE_LIST_LIMIT, SCHEDULE_LIST_LIMIT,
};

/// Source of "now" for record timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Business rules over the record store
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        ScheduleService { store, clock }
    }

    /// Schedule summaries as the store orders them, without responses
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, ServiceError> {
        let records = self.store.list_schedules(SCHEDULE_LIST_LIMIT).await?;
        let now = self.clock.now();
        Ok(records
            .into_iter()
            .map(|record| map_schedule(record, Vec::new(), now))
            .collect())
    }

    /// Fetches a schedule and joins every response to it, newest first
    pub async fn get_schedule_by_id(&self, id: &str) -> Result<Option<Schedule>, ServiceError> {
        let record = match self.store.get_schedule(id).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        let mut responses = self
            .store
            .list_responses(&ResponseFilter::by_schedule(id), RESPONSE_LIST_LIMIT)
            .await?;
        responses.sort_by(|a, b| b.last_touched().cmp(&a.last_touched()));
        debug!("joined {} responses into schedule {}", responses.len(), id);

        Ok(Some(map_schedule(record, responses, self.clock.now())))
    }

    pub async fn create_schedule(
        &self,
        payload: &CreateSchedulePayload,
    ) -> Result<Schedule, ServiceError> {
        let draft = payload.validate()?;
        let now = self.clock.now();

        let created = self
            .store
            .create_schedule(NewSchedule {
                title: draft.title,
                description: draft.description,
                candidates: draft.candidates,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!("created schedule {} ({} candidates)", created.id, created.candidates.len());

        // Read back the joined view rather than trusting the create echo
        self.get_schedule_by_id(&created.id)
            .await?
            .ok_or(ServiceError::CreatedButMissing)
    }

    /// Creates or overwrites the caller's answer, keyed by normalized name
    pub async fn upsert_response(
        &self,
        schedule_id: &str,
        payload: &ResponsePayload,
    ) -> Result<Schedule, ServiceError> {
        let schedule = self
            .get_schedule_by_id(schedule_id)
            .await?
            .ok_or(ServiceError::ScheduleNotFound)?;

        let draft = payload.validate()?;
        let answers = normalize_answers(&schedule.candidates, &draft.answers);
        let now = self.clock.now();

        let existing = self
            .store
            .list_responses(
                &ResponseFilter::by_participant(schedule_id, &draft.normalized_name),
                1,
            )
            .await?
            .into_iter()
            .next();

        match existing {
            Some(existing) => {
                self.store
                    .update_response(ResponseUpdate {
                        id: existing.id.clone(),
                        schedule_id: schedule_id.to_string(),
                        name: draft.name,
                        normalized_name: draft.normalized_name,
                        comment: draft.comment,
                        answers,
                        updated_at: now,
                    })
                    .await?;
                info!("updated response {} on schedule {}", existing.id, schedule_id);
            }
            None => {
                let created = self
                    .store
                    .create_response(NewResponse {
                        schedule_id: schedule_id.to_string(),
                        name: draft.name,
                        normalized_name: draft.normalized_name,
                        comment: draft.comment,
                        answers,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
                info!("created response {} on schedule {}", created.id, schedule_id);
            }
        }

        self.get_schedule_by_id(schedule_id)
            .await?
            .ok_or(ServiceError::DisappearedAfterUpdate)
    }

    /// Per-candidate answer counts for one schedule
    pub async fn summarize_schedule(&self, id: &str) -> Result<Vec<CandidateSummary>, ServiceError> {
        let schedule = self
            .get_schedule_by_id(id)
            .await?
            .ok_or(ServiceError::ScheduleNotFound)?;
        Ok(summarize(&schedule))
    }
}

fn map_schedule(
    record: ScheduleRecord,
    responses: Vec<ResponseRecord>,
    now: DateTime<Utc>,
) -> Schedule {
    let candidates: Vec<String> = record.candidates.into_iter().flatten().collect();
    let responses = responses
        .into_iter()
        .map(|response| map_response(response, &candidates, now))
        .collect();

    Schedule {
        id: record.id,
        title: record.title,
        description: record.description,
        candidates,
        created_at: record.created_at.unwrap_or(now),
        responses,
    }
}

fn map_response(
    record: ResponseRecord,
    candidates: &[String],
    now: DateTime<Utc>,
) -> ParticipantResponse {
    ParticipantResponse {
        answers: normalize_answers(candidates, &record.answers),
        updated_at: record.updated_at.or(record.created_at).unwrap_or(now),
        id: record.id,
        name: record.name,
        comment: record.comment,
        created_at: record.created_at,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::schedule::Availability;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::sync::Mutex;

    /// Clock that moves forward one minute per reading
    pub struct SteppingClock(Mutex<DateTime<Utc>>);

    impl SteppingClock {
        pub fn new() -> Self {
            SteppingClock(Mutex::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()))
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut now = self.0.lock().unwrap();
            *now += Duration::minutes(1);
            *now
        }
    }

    pub fn memory_service() -> ScheduleService {
        ScheduleService::with_clock(Arc::new(MemoryStore::new()), Arc::new(SteppingClock::new()))
    }

    fn create_payload(value: serde_json::Value) -> CreateSchedulePayload {
        serde_json::from_value(value).unwrap()
    }

    fn response_payload(value: serde_json::Value) -> ResponsePayload {
        serde_json::from_value(value).unwrap()
    }

    async fn sync_schedule(service: &ScheduleService) -> Schedule {
        service
            .create_schedule(&create_payload(json!({
                "title": "Sync",
                "candidates": ["2025-01-01T10:00", "2025-01-01T10:00", "2025-01-02T09:00"]
            })))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_collapses_duplicates_and_returns_joined_view() {
        let service = memory_service();
        let schedule = sync_schedule(&service).await;

        assert_eq!(schedule.title, "Sync");
        assert_eq!(
            schedule.candidates,
            vec!["2025-01-01T10:00:00.000Z", "2025-01-02T09:00:00.000Z"]
        );
        assert!(schedule.responses.is_empty());
        assert!(service.get_schedule_by_id(&schedule.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_rejects_bad_payloads() {
        let service = memory_service();

        let err = service
            .create_schedule(&create_payload(json!({ "title": "  ", "candidates": ["2025-01-01"] })))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingTitle));

        let err = service
            .create_schedule(&create_payload(json!({ "title": "Sync", "candidates": [] })))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoCandidates));

        let err = service
            .create_schedule(&create_payload(json!({ "title": "Sync", "candidates": ["not-a-date"] })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid candidate date: not-a-date");

        assert!(service.list_schedules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_schedule_is_absent() {
        let service = memory_service();
        assert!(service.get_schedule_by_id("missing").await.unwrap().is_none());

        let err = service
            .upsert_response("missing", &response_payload(json!({ "name": "Alice", "answers": {} })))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn same_normalized_name_updates_in_place() {
        let service = memory_service();
        let schedule = sync_schedule(&service).await;
        let first = &schedule.candidates[0];
        let second = &schedule.candidates[1];

        let after_first = service
            .upsert_response(
                &schedule.id,
                &response_payload(json!({ "name": "Alice", "answers": { first: "available" } })),
            )
            .await
            .unwrap();
        let original = after_first.responses[0].clone();

        let after_second = service
            .upsert_response(
                &schedule.id,
                &response_payload(json!({
                    "name": " alice ",
                    "comment": "late start please",
                    "answers": { first: "maybe", second: "available" }
                })),
            )
            .await
            .unwrap();

        assert_eq!(after_second.responses.len(), 1);
        let updated = &after_second.responses[0];
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.name, "alice");
        assert_eq!(updated.comment.as_deref(), Some("late start please"));
        assert_eq!(updated.answers[first], Availability::Maybe);
        assert_eq!(updated.answers[second], Availability::Available);
        assert!(updated.updated_at > original.updated_at);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn answers_cover_every_candidate() {
        let service = memory_service();
        let schedule = sync_schedule(&service).await;

        let updated = service
            .upsert_response(
                &schedule.id,
                &response_payload(json!({
                    "name": "Bob",
                    "answers": { "2030-01-01T00:00:00.000Z": "available" }
                })),
            )
            .await
            .unwrap();

        let answers = &updated.responses[0].answers;
        assert_eq!(answers.len(), schedule.candidates.len());
        assert!(answers.values().all(|a| *a == Availability::Unavailable));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let service = memory_service();
        let schedule = sync_schedule(&service).await;

        let err = service
            .upsert_response(&schedule.id, &response_payload(json!({ "name": "   ", "answers": {} })))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingName));
    }

    #[tokio::test]
    async fn responses_are_newest_first() {
        let service = memory_service();
        let schedule = sync_schedule(&service).await;

        for name in ["Alice", "Bob", "Carol"] {
            service
                .upsert_response(&schedule.id, &response_payload(json!({ "name": name, "answers": {} })))
                .await
                .unwrap();
        }
        let view = service
            .upsert_response(&schedule.id, &response_payload(json!({ "name": "ALICE", "answers": {} })))
            .await
            .unwrap();

        let names: Vec<_> = view.responses.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ALICE", "Carol", "Bob"]);
    }

    #[tokio::test]
    async fn summary_tallies_answers() {
        let service = memory_service();
        let schedule = sync_schedule(&service).await;
        let first = schedule.candidates[0].clone();

        for (name, answer) in [("Alice", "available"), ("Bob", "maybe")] {
            service
                .upsert_response(
                    &schedule.id,
                    &response_payload(json!({ "name": name, "answers": { first.clone(): answer } })),
                )
                .await
                .unwrap();
        }

        let summary = service.summarize_schedule(&schedule.id).await.unwrap();
        assert_eq!(summary[0].available, 1);
        assert_eq!(summary[0].maybe, 1);
        assert_eq!(summary[1].unavailable, 2);
    }

    #[test]
    fn responses_without_timestamps_sort_last() {
        let dated = ResponseRecord {
            id: "a".to_string(),
            schedule_id: "s".to_string(),
            name: "a".to_string(),
            normalized_name: "a".to_string(),
            comment: None,
            answers: Default::default(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            updated_at: None,
        };
        let undated = ResponseRecord {
            id: "b".to_string(),
            created_at: None,
            ..dated.clone()
        };

        assert_eq!(undated.last_touched(), DateTime::<Utc>::UNIX_EPOCH);
        assert!(dated.last_touched() > undated.last_touched());

        let now = Utc::now();
        let view = map_response(undated, &["x".to_string()], now);
        assert_eq!(view.updated_at, now);
        assert_eq!(view.answers["x"], Availability::Unavailable);
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl Store for FailingStore {
        async fn list_schedules(&self, _: usize) -> Result<Vec<ScheduleRecord>, StoreError> {
            Err(StoreError::from_messages(["Network error", "Unauthorized"]))
        }
        async fn get_schedule(&self, _: &str) -> Result<Option<ScheduleRecord>, StoreError> {
            Err(StoreError::from_messages(["Unauthorized"]))
        }
        async fn create_schedule(&self, _: NewSchedule) -> Result<ScheduleRecord, StoreError> {
            Err(StoreError::NoResult)
        }
        async fn list_responses(
            &self,
            _: &ResponseFilter,
            _: usize,
        ) -> Result<Vec<ResponseRecord>, StoreError> {
            Err(StoreError::NoResult)
        }
        async fn create_response(&self, _: NewResponse) -> Result<ResponseRecord, StoreError> {
            Err(StoreError::NoResult)
        }
        async fn update_response(&self, _: ResponseUpdate) -> Result<ResponseRecord, StoreError> {
            Err(StoreError::NoResult)
        }
    }

    pub fn failing_service() -> ScheduleService {
        ScheduleService::new(Arc::new(FailingStore))
    }

    #[tokio::test]
    async fn store_failures_pass_through() {
        let err = failing_service().list_schedules().await.unwrap_err();
        assert!(err.is_store());
        assert_eq!(err.to_string(), "Network error, Unauthorized");
    }
}
