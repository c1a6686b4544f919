use serde::Deserialize;

use anycheckin_domain::challenge::ChallengeError;
use anycheckin_domain::shared::DomainError;

pub(super) const SIGN_IN_PATH: &str = "/api/user/sign_in";
pub(super) const SELF_PATH: &str = "/api/user/self";
pub(super) const REFERER_PATH: &str = "/console/personal";
pub(super) const JSON_ACCEPT: &str = "application/json, text/plain, */*";
pub(super) const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub(super) const USER_ID_HEADER: &str = "new-api-user";

/// `quota` units per currency unit reported by the site.
pub const QUOTA_PER_UNIT: f64 = 500_000.0;

/// Messages the site uses when a session is rejected.
const UNAUTHORIZED_MARKERS: [&str; 4] = ["unauthorized", "未授权", "未登录", "无权进行此操作"];

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("session rejected: {0}")]
    SessionInvalid(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("challenge failed: {0}")]
    Challenge(#[from] ChallengeError),

    #[error("site error: {0}")]
    Remote(String),

    #[error("session is empty")]
    EmptySession,
}

impl From<reqwest::Error> for SiteError {
    fn from(error: reqwest::Error) -> Self {
        SiteError::Transport(error.to_string())
    }
}

impl From<SiteError> for DomainError {
    fn from(error: SiteError) -> Self {
        match error {
            SiteError::SessionInvalid(_) | SiteError::EmptySession => {
                DomainError::InvalidSession(error.to_string())
            }
            SiteError::Challenge(_) | SiteError::Remote(_) => {
                DomainError::CheckInFailed(error.to_string())
            }
            SiteError::Transport(_) => DomainError::Infrastructure(error.to_string()),
        }
    }
}

/// Identity and balance reported by `/api/user/self`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub user_id: i64,
    pub username: String,
    pub role: i64,
    pub status: i64,
    pub quota: i64,
    pub balance: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SelfResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: SelfData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SelfData {
    pub id: i64,
    pub username: String,
    pub role: i64,
    pub status: i64,
    pub quota: i64,
}

impl From<SelfData> for AccountProfile {
    fn from(data: SelfData) -> Self {
        Self {
            user_id: data.id,
            username: data.username,
            role: data.role,
            status: data.status,
            quota: data.quota,
            balance: quota_to_balance(data.quota),
        }
    }
}

/// Converts raw quota to a balance rounded to two decimals.
pub fn quota_to_balance(quota: i64) -> f64 {
    (quota as f64 / QUOTA_PER_UNIT * 100.0).round() / 100.0
}

pub fn is_unauthorized_message(message: &str) -> bool {
    if message.is_empty() {
        return false;
    }
    let lower = message.to_lowercase();
    UNAUTHORIZED_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_to_balance() {
        assert_eq!(quota_to_balance(0), 0.0);
        assert_eq!(quota_to_balance(500_000), 1.0);
        assert_eq!(quota_to_balance(12_345_678), 24.69);
        assert_eq!(quota_to_balance(750_000), 1.5);
        assert_eq!(quota_to_balance(2_499), 0.0);
    }

    #[test]
    fn test_unauthorized_markers() {
        assert!(is_unauthorized_message("Unauthorized access"));
        assert!(is_unauthorized_message("无权进行此操作，未登录且未提供 access token"));
        assert!(is_unauthorized_message("用户未授权"));
        assert!(!is_unauthorized_message(""));
        assert!(!is_unauthorized_message("rate limited"));
    }

    #[test]
    fn test_self_response_tolerates_missing_fields() {
        let payload: SelfResponse =
            serde_json::from_str(r#"{"success":true,"data":{"id":7,"quota":1000000}}"#).unwrap();
        assert!(payload.success);
        let profile = AccountProfile::from(payload.data);
        assert_eq!(profile.user_id, 7);
        assert_eq!(profile.username, "");
        assert_eq!(profile.balance, 2.0);
    }

    #[test]
    fn test_site_error_maps_to_domain_error() {
        let mapped: DomainError = SiteError::SessionInvalid("401".into()).into();
        assert!(matches!(mapped, DomainError::InvalidSession(_)));
        let mapped: DomainError = SiteError::Transport("timeout".into()).into();
        assert!(matches!(mapped, DomainError::Infrastructure(_)));
    }
}
