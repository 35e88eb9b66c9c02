//! System keychain secret store
//!
//! Uses the OS keychain:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};
use crate::logging::file_logger as log;

/// Secret store backed by the system keychain, namespaced by a service name
pub struct KeychainSecretStore {
    service_name: String,
}

impl KeychainSecretStore {
    /// Create a new keychain store with the default service name "graphchat"
    pub fn new() -> Self {
        Self::with_service("graphchat")
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service_name: service.into(),
        }
    }

    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|e| SecretStoreError::Other(format!("Failed to create keychain entry: {}", e)))
    }
}

impl Default for KeychainSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn is_available(&self) -> bool {
        match Entry::new(&self.service_name, "__graphchat_availability_check__") {
            Ok(_) => true,
            Err(e) => {
                log::warn("KeychainSecretStore", &format!("keychain unavailable: {:?}", e));
                false
            }
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(e) => {
                log::error("KeychainSecretStore", &e.to_string());
                return None;
            }
        };

        match entry.get_password() {
            Ok(password) => Some(password),
            Err(keyring::Error::NoEntry) => {
                log::debug("KeychainSecretStore", &format!("no entry for '{}'", key));
                None
            }
            Err(e) => {
                log::warn("KeychainSecretStore", &format!("get('{}') failed: {:?}", key, e));
                None
            }
        }
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        log::info(
            "KeychainSecretStore",
            &format!("storing '{}' under service '{}'", key, self.service_name),
        );
        self.entry(key)?
            .set_password(value)
            .map_err(|e| SecretStoreError::Other(format!("Failed to store in keychain: {}", e)))
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretStoreError::Other(format!("Failed to delete from keychain: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires system keychain
    fn test_store_and_get() {
        let store = KeychainSecretStore::with_service("graphchat-test");
        let _ = store.delete("test_key");

        store.store("test_key", "test_value").unwrap();
        assert_eq!(store.get("test_key"), Some("test_value".to_string()));

        store.delete("test_key").unwrap();
        assert_eq!(store.get("test_key"), None);
    }

    #[test]
    fn test_name() {
        let store = KeychainSecretStore::new();
        assert_eq!(store.name(), "keychain");
    }
}
