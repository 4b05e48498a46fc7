use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Barrier;

use super::{MemoryStore, Store};
use crate::error::StoreError;

fn down<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

// Store whose every call fails
pub struct BrokenStore;

#[async_trait]
impl Store for BrokenStore {
    async fn get_int(&self, _key: &str) -> Result<u64, StoreError> {
        down()
    }

    async fn incr_with_ttl(&self, _keys: &[&str], _ttl: Duration) -> Result<(), StoreError> {
        down()
    }

    async fn delete(&self, _keys: &[&str]) -> Result<(), StoreError> {
        down()
    }

    async fn add_member(&self, _set: &str, _value: &str) -> Result<(), StoreError> {
        down()
    }

    async fn remove_member(&self, _set: &str, _value: &str) -> Result<(), StoreError> {
        down()
    }

    async fn members(&self, _set: &str) -> Result<Vec<String>, StoreError> {
        down()
    }
}

// Store that never answers
pub struct StalledStore;

#[async_trait]
impl Store for StalledStore {
    async fn get_int(&self, _key: &str) -> Result<u64, StoreError> {
        std::future::pending().await
    }

    async fn incr_with_ttl(&self, _keys: &[&str], _ttl: Duration) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn delete(&self, _keys: &[&str]) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn add_member(&self, _set: &str, _value: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn remove_member(&self, _set: &str, _value: &str) -> Result<(), StoreError> {
        std::future::pending().await
    }

    async fn members(&self, _set: &str) -> Result<Vec<String>, StoreError> {
        std::future::pending().await
    }
}

// MemoryStore whose reads wait until `parties` callers are reading at once
pub struct GatedStore {
    inner: MemoryStore,
    gate: Barrier,
}

impl GatedStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            gate: Barrier::new(parties),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl Store for GatedStore {
    async fn get_int(&self, key: &str) -> Result<u64, StoreError> {
        self.gate.wait().await;
        self.inner.get_int(key).await
    }

    async fn incr_with_ttl(&self, keys: &[&str], ttl: Duration) -> Result<(), StoreError> {
        self.inner.incr_with_ttl(keys, ttl).await
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.inner.delete(keys).await
    }

    async fn add_member(&self, set: &str, value: &str) -> Result<(), StoreError> {
        self.inner.add_member(set, value).await
    }

    async fn remove_member(&self, set: &str, value: &str) -> Result<(), StoreError> {
        self.inner.remove_member(set, value).await
    }

    async fn members(&self, set: &str) -> Result<Vec<String>, StoreError> {
        self.inner.members(set).await
    }
}
