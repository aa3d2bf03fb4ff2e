//! Error types for practica operations.
//!
//! This module provides the error hierarchy shared by the engine, the item bank
//! clients and the server, with structured error codes and suggestions.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for practica operations.
pub type PracticaResult<T> = Result<T, PracticaError>;

/// Main error type for all practica operations.
#[derive(Error, Debug)]
pub enum PracticaError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Skill or record not found.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        resource_id: Option<String>,
    },

    /// Operation not allowed in the current session state.
    #[error("Invalid session state: {message}")]
    SessionState { message: String, code: ErrorCode },

    /// Item bank operation failed.
    #[error("Item bank error: {message}")]
    ItemBank {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication { message: String, code: ErrorCode },

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValEmptySelection,
    ValInvalidItemCount,

    // Skills and learners (SKL_xxx)
    SklNotFound,
    SklLearnerNotFound,

    // Session (SES_xxx)
    SesNoCurrentItem,
    SesDisposed,

    // Item bank (BANK_xxx)
    BankFetchFailed,
    BankGradeFailed,
    BankInvalidResponse,

    // Database (DB_xxx)
    DbOperationFailed,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Authentication (AUTH_xxx)
    AuthInvalidKey,

    // Parse (PARSE_xxx)
    ParseInvalidTimestamp,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValEmptySelection => "VAL_003",
            ErrorCode::ValInvalidItemCount => "VAL_004",
            ErrorCode::SklNotFound => "SKL_001",
            ErrorCode::SklLearnerNotFound => "SKL_002",
            ErrorCode::SesNoCurrentItem => "SES_001",
            ErrorCode::SesDisposed => "SES_002",
            ErrorCode::BankFetchFailed => "BANK_001",
            ErrorCode::BankGradeFailed => "BANK_002",
            ErrorCode::BankInvalidResponse => "BANK_003",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::AuthInvalidKey => "AUTH_001",
            ErrorCode::ParseInvalidTimestamp => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl PracticaError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create the error returned when a custom review has no skills.
    pub fn empty_selection() -> Self {
        Self::Validation {
            message: "A custom review needs at least one skill".to_string(),
            code: ErrorCode::ValEmptySelection,
            details: HashMap::new(),
            suggestion: Some("Select one or more skills before starting".to_string()),
        }
    }

    /// Create the error returned for an unsupported custom review size.
    pub fn invalid_item_count(count: u32) -> Self {
        let mut details = HashMap::new();
        details.insert("item_count".to_string(), count.to_string());
        Self::Validation {
            message: format!("Unsupported item count {}", count),
            code: ErrorCode::ValInvalidItemCount,
            details,
            suggestion: Some("Use 10, 20 or 30 items".to_string()),
        }
    }

    /// Create a skill not found error.
    pub fn skill_not_found(skill_id: impl Into<String>) -> Self {
        let id = skill_id.into();
        Self::NotFound {
            message: format!("Skill '{}' not found", id),
            code: ErrorCode::SklNotFound,
            resource_id: Some(id),
        }
    }

    /// Create a learner not found error.
    pub fn learner_not_found(user_id: impl Into<String>) -> Self {
        let id = user_id.into();
        Self::NotFound {
            message: format!("Learner '{}' is not signed in", id),
            code: ErrorCode::SklLearnerNotFound,
            resource_id: Some(id),
        }
    }

    /// Create an error for an operation that needs a presented item.
    pub fn no_current_item() -> Self {
        Self::SessionState {
            message: "No item is currently presented".to_string(),
            code: ErrorCode::SesNoCurrentItem,
        }
    }

    /// Create an error for an operation on a disposed session.
    pub fn session_disposed() -> Self {
        Self::SessionState {
            message: "Practice session has been disposed".to_string(),
            code: ErrorCode::SesDisposed,
        }
    }

    /// Create an item bank fetch error.
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::ItemBank {
            message: message.into(),
            code: ErrorCode::BankFetchFailed,
            source: None,
        }
    }

    /// Create an item bank grading error.
    pub fn grade_failed(message: impl Into<String>) -> Self {
        Self::ItemBank {
            message: message.into(),
            code: ErrorCode::BankGradeFailed,
            source: None,
        }
    }

    /// Create an error for a stored timestamp that does not parse.
    pub fn invalid_timestamp(value: &str, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            message: format!("Invalid timestamp '{}': {}", value, reason),
            code: ErrorCode::ParseInvalidTimestamp,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::SessionState { code, .. } => *code,
            Self::ItemBank { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Authentication { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::NotFound { .. } => Some("Please check the identifier and ensure it exists"),
            Self::SessionState { .. } => Some("Request an item before submitting or asking for hints"),
            Self::ItemBank { .. } => Some("Please check the item bank URL and connectivity"),
            Self::Database { .. } => Some("Please check the mastery database path and permissions"),
            Self::Authentication { .. } => Some("Please check the item bank API key"),
            _ => None,
        }
    }

    /// Convert from HTTP status code (for client errors).
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
                details: HashMap::new(),
                suggestion: Some("Please check your request parameters".to_string()),
            },
            401 | 403 => Self::Authentication {
                message: body.to_string(),
                code: ErrorCode::AuthInvalidKey,
            },
            404 => Self::NotFound {
                message: body.to_string(),
                code: ErrorCode::SklNotFound,
                resource_id: None,
            },
            408 | 504 => Self::Network {
                message: body.to_string(),
                code: ErrorCode::NetTimeout,
                source: None,
            },
            _ => Self::Internal(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<rusqlite::Error> for PracticaError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
