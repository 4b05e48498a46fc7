use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

mod memory;

pub use memory::{MemoryStore, sweeper};

// Counters and network sets behind the engine
#[async_trait]
pub trait Store: Send + Sync {
    /// Current value of a counter. Absent or expired keys read as 0.
    async fn get_int(&self, key: &str) -> Result<u64, StoreError>;

    // +1 on every key and expiry reset to ttl, applied as one unit
    async fn incr_with_ttl(&self, keys: &[&str], ttl: Duration) -> Result<(), StoreError>;

    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError>;

    async fn add_member(&self, set: &str, value: &str) -> Result<(), StoreError>;

    /// Removing an absent member is not an error.
    async fn remove_member(&self, set: &str, value: &str) -> Result<(), StoreError>;

    async fn members(&self, set: &str) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
pub(crate) mod fakes;
