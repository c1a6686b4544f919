use super::print_json;
use crate::application::services::AccountService;

pub fn decode(raw: &str) -> anyhow::Result<()> {
    let info = AccountService::verify(raw)?;
    print_json(&info)
}
