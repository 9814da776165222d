pub mod app_config;
pub mod cache_config;
pub mod catalog_config;
pub mod cors_config;
pub mod database_config;
pub mod server_config;
pub mod storage_config;

use std::env;
use std::str::FromStr;

/// Reads `name` from the environment, falling back to `default` when unset or unparsable.
pub fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fall_back_when_variable_missing() {
        assert_eq!(env_or("CATALOG_TEST_SURELY_UNSET", 42u32), 42);
    }
}
