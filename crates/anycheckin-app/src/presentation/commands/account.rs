use anyhow::Context;

use super::print_json;
use crate::presentation::cli::AccountCommands;
use crate::presentation::state::AppState;
use anycheckin_domain::shared::AccountId;

pub async fn handle(state: &AppState, cmd: AccountCommands) -> anyhow::Result<()> {
    let service = &state.services.account;
    match cmd {
        AccountCommands::Add { name, session } => {
            let account = service
                .create(name, session)
                .await
                .context("Failed to add account")?;
            print_json(&account)
        }
        AccountCommands::List => print_json(&service.list().await?),
        AccountCommands::Update { id, name, session } => {
            let account = service.update(AccountId::new(id), name, session).await?;
            print_json(&account)
        }
        AccountCommands::Enable { id } => {
            print_json(&service.set_enabled(AccountId::new(id), true).await?)
        }
        AccountCommands::Disable { id } => {
            print_json(&service.set_enabled(AccountId::new(id), false).await?)
        }
        AccountCommands::Delete { id } => {
            service.delete(AccountId::new(id)).await?;
            println!("Account {} deleted", id);
            Ok(())
        }
        AccountCommands::CheckIn { id } => {
            print_json(&service.check_in(AccountId::new(id)).await?)
        }
        AccountCommands::Refresh { id } => {
            let account = service
                .refresh(AccountId::new(id))
                .await
                .with_context(|| format!("Failed to refresh account {}", id))?;
            print_json(&account)
        }
    }
}
