use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{Instant, interval};

use super::Store;
use crate::error::StoreError;
use crate::metrics::BUCKETS;

// Counter with expiry - tracks attempts per login/password/ip key
#[derive(Clone, Debug)]
struct Bucket {
    count: u64,
    expires_at: Instant,
}

impl Bucket {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process store backed by concurrent maps.
///
/// Reads are lock-free. Multi-key writes go through `batch` so a whole
/// increment batch is never interleaved with another one.
#[derive(Default)]
pub struct MemoryStore {
    buckets: DashMap<String, Bucket>,
    sets: DashMap<String, HashSet<String>>,
    batch: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Drop expired buckets, returns how many were evicted
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.buckets.retain(|_, bucket| {
            let live = bucket.is_live(now);
            if !live {
                evicted += 1;
            }
            live
        });
        evicted
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    // Forget every bucket and every list member
    pub fn clear(&self) {
        self.buckets.clear();
        self.sets.clear();
    }

    fn lock_batch(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.batch
            .lock()
            .map_err(|_| StoreError::Unavailable("batch lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_int(&self, key: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        Ok(match self.buckets.get(key) {
            Some(bucket) if bucket.is_live(now) => bucket.count,
            _ => 0,
        })
    }

    async fn incr_with_ttl(&self, keys: &[&str], ttl: Duration) -> Result<(), StoreError> {
        let _guard = self.lock_batch()?;
        let now = Instant::now();

        for key in keys {
            let mut bucket = self.buckets.entry((*key).to_string()).or_insert(Bucket {
                count: 0,
                expires_at: now,
            });
            // window lapsed with no hits, start over
            if !bucket.is_live(now) {
                bucket.count = 0;
            }
            bucket.count += 1;
            bucket.expires_at = now + ttl;
        }
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.lock_batch()?;
        for key in keys {
            self.buckets.remove(*key);
        }
        Ok(())
    }

    async fn add_member(&self, set: &str, value: &str) -> Result<(), StoreError> {
        self.sets
            .entry(set.to_string())
            .or_default()
            .insert(value.to_string());
        Ok(())
    }

    async fn remove_member(&self, set: &str, value: &str) -> Result<(), StoreError> {
        if let Some(mut members) = self.sets.get_mut(set) {
            members.remove(value);
        }
        Ok(())
    }

    async fn members(&self, set: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .sets
            .get(set)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}

// Background sweeper - evicts idle buckets so the map does not grow forever
pub async fn sweeper(store: Arc<MemoryStore>, every: Duration) {
    let mut interval = interval(every);

    tracing::info!(interval = ?every, "bucket sweeper started");

    loop {
        interval.tick().await;

        let evicted = store.sweep();
        let live = store.bucket_count();
        BUCKETS.set(live as f64);

        if evicted > 0 {
            tracing::debug!(evicted, live, "swept expired buckets");
        }
    }
}
