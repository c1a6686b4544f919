use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::check_in::CheckInOutcome;
use crate::session::SessionInfo;
use crate::shared::{AccountId, DomainError};

/// A site account signed in with a stored session cookie.
///
/// `user_id`, `username` and `role` are cached from the decoded session
/// (or the profile endpoint) for display; the session itself stays the
/// source of truth.
#[derive(Clone, Serialize)]
pub struct Account {
    id: AccountId,
    name: String,
    #[serde(skip_serializing)]
    session: String,
    user_id: i64,
    username: String,
    role: i64,
    enabled: bool,
    balance: Option<f64>,
    last_check_in: Option<DateTime<Utc>>,
    last_result: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, session: String, identity: &SessionInfo) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }
        if session.trim().is_empty() {
            return Err(DomainError::InvalidSession(
                "Session is required".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: AccountId::UNSAVED,
            name: name.to_string(),
            session: session.trim().to_string(),
            user_id: identity.user_id,
            username: identity.username.clone(),
            role: identity.role,
            enabled: true,
            balance: None,
            last_check_in: None,
            last_result: None,
            created_at: now,
            updated_at: now,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: AccountId,
        name: String,
        session: String,
        user_id: i64,
        username: String,
        role: i64,
        enabled: bool,
        balance: Option<f64>,
        last_check_in: Option<DateTime<Utc>>,
        last_result: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            session,
            user_id,
            username,
            role,
            enabled,
            balance,
            last_check_in,
            last_result,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> i64 {
        self.role
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn balance(&self) -> Option<f64> {
        self.balance
    }

    pub fn last_check_in(&self) -> Option<DateTime<Utc>> {
        self.last_check_in
    }

    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn rename(&mut self, name: String) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }
        self.name = name.to_string();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Swaps in a new session together with the identity decoded from it.
    pub fn replace_session(&mut self, session: String, identity: &SessionInfo) {
        self.session = session.trim().to_string();
        self.user_id = identity.user_id;
        self.username = identity.username.clone();
        self.role = identity.role;
        self.updated_at = Utc::now();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.updated_at = Utc::now();
    }

    /// Applies what the profile endpoint reported.
    pub fn update_profile(&mut self, user_id: i64, username: String, role: i64, balance: f64) {
        if user_id > 0 {
            self.user_id = user_id;
        }
        if !username.is_empty() {
            self.username = username;
        }
        self.role = role;
        self.balance = Some(balance);
        self.updated_at = Utc::now();
    }

    pub fn record_check_in(&mut self, at: DateTime<Utc>, outcome: &CheckInOutcome) {
        self.last_check_in = Some(at);
        self.last_result = Some(outcome.message.clone());
        self.updated_at = at;
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("session", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("enabled", &self.enabled)
            .field("last_check_in", &self.last_check_in)
            .finish()
    }
}
