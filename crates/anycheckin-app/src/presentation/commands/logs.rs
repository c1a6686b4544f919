use super::print_json;
use crate::presentation::state::AppState;

pub async fn show(state: &AppState, limit: i64) -> anyhow::Result<()> {
    let summary = state.services.check_in_log.summary(limit).await?;
    print_json(&summary)
}

pub async fn notify_test(state: &AppState) -> anyhow::Result<()> {
    state.services.check_in_log.send_test_notification().await?;
    println!("Test notification sent");
    Ok(())
}
