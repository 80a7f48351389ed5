use thiserror::Error;

use super::domain::Command;

/// Business errors for record operations.
///
/// `Display` is the client-facing text; store details are kept for logs only.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Cannot create new record: key already exists.")]
    Conflict,
    #[error("{}", not_found_message(.0))]
    NotFound(Command),
    #[error("Cannot connect to redis.")]
    StoreUnavailable(String),
    #[error("Unable to delete record.")]
    DeleteIncomplete { removed: u64 },
}

fn not_found_message(command: &Command) -> &'static str {
    match command {
        Command::Update => "Cannot update record: key does not exist.",
        Command::Retrieve => "Cannot retrieve record: key does not exist.",
        Command::Delete => "Cannot delete record: key does not exist.",
        Command::Create => "Cannot create new record: key does not exist.",
    }
}

impl RecordError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            RecordError::MalformedRequest(_) => 2001,
            RecordError::Conflict => 2002,
            RecordError::NotFound(_) => 2003,
            RecordError::StoreUnavailable(_) => 2101,
            RecordError::DeleteIncomplete { .. } => 2102,
        }
    }

    /// True for failures caused by the store rather than by the request.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, RecordError::StoreUnavailable(_) | RecordError::DeleteIncomplete { .. })
    }
}

impl From<super::store::StoreError> for RecordError {
    fn from(e: super::store::StoreError) -> Self {
        RecordError::StoreUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_wire_contract() {
        assert_eq!(RecordError::Conflict.to_string(), "Cannot create new record: key already exists.");
        assert_eq!(RecordError::StoreUnavailable("io".into()).to_string(), "Cannot connect to redis.");
        assert_eq!(
            RecordError::NotFound(Command::Retrieve).to_string(),
            "Cannot retrieve record: key does not exist."
        );
        assert_eq!(RecordError::DeleteIncomplete { removed: 0 }.to_string(), "Unable to delete record.");
    }

    #[test]
    fn store_failures_are_flagged() {
        assert!(RecordError::StoreUnavailable(String::new()).is_store_failure());
        assert!(RecordError::DeleteIncomplete { removed: 0 }.is_store_failure());
        assert!(!RecordError::Conflict.is_store_failure());
    }
}
