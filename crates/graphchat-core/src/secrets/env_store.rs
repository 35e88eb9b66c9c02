//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Mapping from provider names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("google", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", vec!["GROQ_API_KEY"]);
    m.insert("xai", vec!["XAI_API_KEY"]);
    m.insert("deepseek", vec!["DEEPSEEK_API_KEY"]);
    m.insert("ollama", vec![]);
    m.insert("mock", vec![]);
    m
});

/// Read-only secret store backed by environment variables
///
/// Provider names map to their conventional variables (`anthropic` →
/// `ANTHROPIC_API_KEY`); unknown names fall back to `<NAME>_API_KEY`, and a
/// full variable name is accepted as-is.
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Get the environment variable names for a provider
    pub fn env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(provider.to_lowercase().as_str()).map(|v| v.as_slice())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = non_empty_var(key) {
            return Some(value);
        }

        if let Some(env_vars) = Self::env_vars_for_provider(key) {
            if let Some(value) = env_vars.iter().find_map(|var| non_empty_var(var)) {
                return Some(value);
            }
        }

        non_empty_var(&format!("{}_API_KEY", key.to_uppercase()))
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_store_read_only() {
        let store = EnvSecretStore::new();
        assert_eq!(store.name(), "env");
        assert!(matches!(store.store("test", "value"), Err(SecretStoreError::ReadOnly)));
        assert!(matches!(store.delete("test"), Err(SecretStoreError::ReadOnly)));
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("GRAPHCHAT_TEST_SECRET_DIRECT", "test_value");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("GRAPHCHAT_TEST_SECRET_DIRECT"), Some("test_value".to_string()));

        env::remove_var("GRAPHCHAT_TEST_SECRET_DIRECT");
    }

    #[test]
    fn test_env_store_suffix_fallback() {
        env::set_var("GRAPHCHATTEST_API_KEY", "sk-fallback");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("graphchattest"), Some("sk-fallback".to_string()));

        env::remove_var("GRAPHCHATTEST_API_KEY");
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(
            EnvSecretStore::env_vars_for_provider("Anthropic"),
            Some(&["ANTHROPIC_API_KEY"][..])
        );
        assert_eq!(EnvSecretStore::env_vars_for_provider("mock").map(|v| v.len()), Some(0));
        assert!(EnvSecretStore::env_vars_for_provider("nonexistent_provider_xyz").is_none());
    }

    #[test]
    fn test_env_store_get_not_found() {
        let store = EnvSecretStore::new();
        assert_eq!(store.get("nonexistent_provider_xyz"), None);
        assert!(!store.get_info("nonexistent_provider_xyz").available);
    }
}
