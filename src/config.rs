use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

/// Connection settings for the external AI search service.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = require_env("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: require_env("JWT_SECRET")?,
        };
        let search = SearchConfig {
            base_url: require_env("SEARCH_SERVICE_URL")?,
            api_key: require_env("SEARCH_SERVICE_API_KEY")?,
            connect_timeout_secs: env_or("SEARCH_CONNECT_TIMEOUT_SECS", 5),
            request_timeout_secs: env_or("SEARCH_REQUEST_TIMEOUT_SECS", 30),
        };
        Ok(Self {
            database_url,
            jwt,
            search,
        })
    }
}

// Secrets and endpoints have no fallbacks: a missing variable is a startup
// error, not something to paper over with a default.
fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} must be set"))
}

fn env_or(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_unset_or_garbage() {
        assert_eq!(env_or("PROPSEARCH_TEST_UNSET_TIMEOUT", 5), 5);
        std::env::set_var("PROPSEARCH_TEST_GARBAGE_TIMEOUT", "not-a-number");
        assert_eq!(env_or("PROPSEARCH_TEST_GARBAGE_TIMEOUT", 30), 30);
    }

    #[test]
    fn require_env_names_the_missing_variable() {
        let err = require_env("PROPSEARCH_TEST_MISSING_VAR").unwrap_err();
        assert!(err.to_string().contains("PROPSEARCH_TEST_MISSING_VAR"));
    }
}
