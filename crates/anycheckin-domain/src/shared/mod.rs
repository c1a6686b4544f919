use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Placeholder carried before storage assigns a row id.
            pub const UNSAVED: Self = Self(0);

            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

// Storage assigns numeric row ids
define_id!(AccountId);
define_id!(TaskId);
define_id!(CheckInLogId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1xxx)
    InvalidSession = 1001,

    // Resource Not Found (2xxx)
    AccountNotFound = 2001,
    TaskNotFound = 2002,
    NotFound = 2003,

    // Business Logic (3xxx)
    CheckInFailed = 3001,
    AccountDisabled = 3003,
    InvalidSchedule = 3004,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,
    DataIntegrityError = 4003,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    NetworkError = 5002,

    // Validation (6xxx)
    ValidationError = 6001,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError | ErrorCode::CheckInFailed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Account disabled: {0}")]
    AccountDisabled(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Check-in failed: {0}")]
    CheckInFailed(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::InvalidSession(_) => ErrorCode::InvalidSession,
            DomainError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            DomainError::TaskNotFound(_) => ErrorCode::TaskNotFound,
            DomainError::AccountDisabled(_) => ErrorCode::AccountDisabled,
            DomainError::InvalidSchedule(_) => ErrorCode::InvalidSchedule,
            DomainError::CheckInFailed(_) => ErrorCode::CheckInFailed,
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::DataIntegrity(_) => ErrorCode::DataIntegrityError,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::InvalidSession(msg)
            | DomainError::AccountNotFound(msg)
            | DomainError::TaskNotFound(msg)
            | DomainError::AccountDisabled(msg)
            | DomainError::InvalidSchedule(msg)
            | DomainError::CheckInFailed(msg)
            | DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Validation(msg)
            | DomainError::DataIntegrity(msg)
            | DomainError::Serialization(msg)
            | DomainError::NotFound(msg) => msg,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
