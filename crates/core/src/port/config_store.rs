// Config Store Port
// Key/value settings owned by the admin layer, read once at startup

use crate::error::Result;
use async_trait::async_trait;

/// Key holding the metrics provider credential
pub const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN";

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Look up a value by key; `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;
}
