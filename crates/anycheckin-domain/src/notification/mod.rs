use async_trait::async_trait;

use crate::shared::DomainError;

/// Delivers the outcome of one account's check-in to the operator.
///
/// Callers log and drop delivery failures; a failed notification never
/// changes the recorded outcome.
#[async_trait]
pub trait CheckInNotifier: Send + Sync {
    async fn notify(
        &self,
        display_name: &str,
        success: bool,
        message: &str,
    ) -> Result<(), DomainError>;
}
