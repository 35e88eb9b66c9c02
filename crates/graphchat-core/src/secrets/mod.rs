//! Secret storage for model API keys
//!
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `EnvSecretStore`, `MemorySecretStore`, `ChainSecretStore`, `KeychainSecretStore`

mod traits;
mod env_store;
mod memory_store;
mod chain_store;
mod keychain_store;

use std::sync::Arc;

pub use traits::{SecretStore, SecretInfo, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
pub use keychain_store::KeychainSecretStore;

/// Environment first, then the system keychain
pub fn default_secret_store() -> Arc<dyn SecretStore> {
    let stores: Vec<Arc<dyn SecretStore>> = vec![
        Arc::new(EnvSecretStore::new()),
        Arc::new(KeychainSecretStore::new()),
    ];
    match ChainSecretStore::new(stores) {
        Ok(chain) => Arc::new(chain),
        Err(_) => Arc::new(EnvSecretStore::new()),
    }
}
