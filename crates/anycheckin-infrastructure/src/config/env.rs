/// Resolves a whole-value placeholder of the form `${VAR:default}` or
/// `${VAR}`. An unset or empty variable yields the default (or an empty
/// string when there is none). Other values are returned unchanged.
pub fn expand_env(value: &str) -> String {
    expand_with(value, |name| std::env::var(name).ok())
}

fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let inner = match value
        .trim()
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(inner) => inner,
        None => return value.to_string(),
    };

    let (name, default) = match inner.split_once(':') {
        Some((name, default)) => (name, default),
        None => (inner, ""),
    };

    match lookup(name.trim()) {
        Some(found) if !found.is_empty() => found,
        _ => default.to_string(),
    }
}
