mod client;

pub use client::{is_unauthorized_message, quota_to_balance, AccountProfile, SiteClient, SiteError};
