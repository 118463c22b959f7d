use std::env::var;
use std::str::FromStr;

/// Get the value of ENV var, or a default
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var_or_else(var_name: &'static str, or_else: fn() -> String) -> String {
    if let Ok(value) = var(var_name) {
        if !value.is_empty() {
            return value;
        }
    }

    or_else()
}

/// Parse the value of ENV var, or use a default when it is missing or unparsable
///
/// An unparsable value is logged, the default wins
pub fn env_var_parsed_or<T>(var_name: &'static str, default: T) -> T
where
    T: FromStr,
{
    match var(var_name) {
        Ok(value) if !value.is_empty() => value.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!("`{var_name}` has an invalid value: {value}, using default");
            default
        }),
        _ => default,
    }
}

/// Interpret a flag-like ENV value
///
/// `true`, `1`, `yes` and `on` (case-insensitive) are truthy
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
