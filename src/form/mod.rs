pub mod submission;
pub mod export;

pub use submission::{CreateSchedulePayload, ResponsePayload};
pub use export::export_responses_to_csv;
