//! Environment helpers shared by the adapter configs.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// First non-blank value among `keys`, trimmed.
#[must_use]
pub fn env_var_any(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
}

/// Value of `key`, or `default` when unset or blank.
#[must_use]
pub fn env_or(key: &str, default: &str) -> String {
    env_var_any(&[key]).unwrap_or_else(|| default.to_owned())
}

/// Like [`env_or`] for base URLs: trailing slashes are stripped.
#[must_use]
pub fn env_base_url(key: &str, default: &str) -> String {
    env_or(key, default).trim_end_matches('/').to_owned()
}

#[must_use]
pub fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
