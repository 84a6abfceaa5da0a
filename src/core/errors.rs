use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum SplitxError {
    /// Group with given ID not found
    #[error("Group {0} not found")]
    GroupNotFound(String),

    /// Expense with given ID not found
    #[error("Expense {0} not found")]
    ExpenseNotFound(String),

    /// Settlement record with given ID not found
    #[error("Settlement record {0} not found")]
    SettlementRecordNotFound(String),

    #[error("Settlement record {0} is already settled")]
    SettlementAlreadyConfirmed(String),

    /// Member with given name is not part of the group
    #[error("Member {0} not found in this group")]
    MemberNotFound(String),

    /// Member name appears twice in one group
    #[error("Member {0} is already in this group")]
    DuplicateMember(String),

    /// Nobody to split an expense between
    #[error("No active members in this group")]
    NoActiveMembers,

    /// Generic input validation error with detailed field information
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    /// Balances failed the zero-sum check or matching left residue
    #[error("Settlement computation failed: {0}")]
    ComputationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Cache error: {0}")]
    CacheError(String),
}

impl SplitxError {
    pub fn invalid(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        SplitxError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }

    /// True for the input-validation family (bad request from the caller).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SplitxError::InvalidInput(..) | SplitxError::NoActiveMembers | SplitxError::DuplicateMember(_)
        )
    }
}
