use thiserror::Error;

/// Failures reported by a record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Error list returned by the store, joined into one message
    #[error("{0}")]
    Remote(String),
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode store payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Amplify Data returned no result")]
    NoResult,
    #[error("no {kind} record with id {id}")]
    UnknownRecord { kind: &'static str, id: String },
    #[error("record store lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Joins the store's error messages the way they are surfaced to callers
    pub fn from_messages<I, S>(messages: I) -> StoreError
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = messages
            .into_iter()
            .map(|m| m.as_ref().to_string())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() {
            StoreError::Remote("Amplify Data request failed".to_string())
        } else {
            StoreError::Remote(joined)
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Invalid candidate date: {0}")]
    InvalidCandidate(String),
    #[error("Provide at least one candidate date/time")]
    NoCandidates,
    #[error("Schedule not found")]
    ScheduleNotFound,
    #[error("Participant name is required")]
    MissingName,
    #[error("Created schedule but could not re-fetch it")]
    CreatedButMissing,
    #[error("Schedule disappeared after updating response")]
    DisappearedAfterUpdate,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::ScheduleNotFound)
    }

    pub fn is_store(&self) -> bool {
        matches!(self, ServiceError::Store(_))
    }
}
