pub mod account;
pub mod logs;
pub mod serve;
pub mod session;
pub mod task;

use anycheckin_domain::shared::DomainError;
use serde::Serialize;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prefixes domain failures with their error code for the CLI.
pub(crate) fn describe_error(err: &anyhow::Error) -> Option<String> {
    let domain = err.downcast_ref::<DomainError>()?;
    if domain.is_recoverable() {
        Some(format!("{} (temporary, retry later)", domain.format_with_code()))
    } else {
        Some(domain.format_with_code())
    }
}
