use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{AccountId, CheckInLogId};

/// Substrings of a sign-in response that mean the account is signed in.
/// Matching is case-sensitive.
pub const SUCCESS_MARKERS: [&str; 2] = ["success", "已签到"];

/// Classifies a raw sign-in response body.
///
/// This is a plain substring test: a body such as `{"success":false}`
/// contains a marker and counts as success.
pub fn classify(raw: &str) -> bool {
    SUCCESS_MARKERS.iter().any(|marker| raw.contains(marker))
}

/// Result of one account's check-in attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInOutcome {
    pub success: bool,
    pub message: String,
}

impl CheckInOutcome {
    pub fn from_response(raw: String) -> Self {
        Self {
            success: classify(&raw),
            message: raw,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Immutable record of a check-in attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInLog {
    id: CheckInLogId,
    account_id: AccountId,
    success: bool,
    message: String,
    created_at: DateTime<Utc>,
}

impl CheckInLog {
    pub fn new(account_id: AccountId, outcome: &CheckInOutcome, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CheckInLogId::UNSAVED,
            account_id,
            success: outcome.success,
            message: outcome.message.clone(),
            created_at,
        }
    }

    pub fn restore(
        id: CheckInLogId,
        account_id: AccountId,
        success: bool,
        message: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            success,
            message,
            created_at,
        }
    }

    pub fn id(&self) -> CheckInLogId {
        self.id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
