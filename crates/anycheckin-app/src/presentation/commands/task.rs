use super::print_json;
use crate::application::services::TaskInput;
use crate::presentation::cli::{TaskArgs, TaskCommands};
use crate::presentation::state::AppState;
use anycheckin_domain::shared::{AccountId, TaskId};

impl From<TaskArgs> for TaskInput {
    fn from(args: TaskArgs) -> Self {
        Self {
            name: args.name,
            cron_expr: args.cron,
            account_ids: args.accounts.into_iter().map(AccountId::new).collect(),
            enabled: !args.disabled,
        }
    }
}

pub async fn handle(state: &AppState, cmd: TaskCommands) -> anyhow::Result<()> {
    let service = &state.services.task;
    match cmd {
        TaskCommands::Add(args) => print_json(&service.create(args.into()).await?),
        TaskCommands::List => print_json(&service.list().await?),
        TaskCommands::Update { id, args } => {
            print_json(&service.update(TaskId::new(id), args.into()).await?)
        }
        TaskCommands::Delete { id } => {
            service.delete(TaskId::new(id)).await?;
            println!("Task {} deleted", id);
            Ok(())
        }
        TaskCommands::Run { id } => {
            let report = service.run_now(TaskId::new(id)).await?;
            print_json(&report)?;
            println!(
                "{}/{} account(s) checked in",
                report.success_count(),
                report.outcomes.len()
            );
            Ok(())
        }
    }
}
