use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::{Error, Result, StoreError};
use crate::metrics::DECISIONS;
use crate::models::Attempt;
use crate::network::{ListKind, NetworkList, parse_addr};
use crate::rate_limit::{BUCKET_TTL, BucketKind, Limits};
use crate::store::Store;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Blacklisted,
    Whitelisted,
    Admitted,
    Limited,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Whitelisted | Decision::Admitted)
    }

    pub fn outcome(self) -> &'static str {
        match self {
            Decision::Blacklisted => "blacklisted",
            Decision::Whitelisted => "whitelisted",
            Decision::Admitted => "admitted",
            Decision::Limited => "limited",
        }
    }
}

pub struct AdmissionEngine {
    store: Arc<dyn Store>,
    lists: NetworkList,
    limits: Limits,
    store_timeout: Duration,
}

impl AdmissionEngine {
    pub fn new(store: Arc<dyn Store>, limits: Limits) -> Self {
        Self {
            lists: NetworkList::new(Arc::clone(&store)),
            store,
            limits,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    // Every store round-trip gets the same deadline
    async fn bounded<T, E>(&self, call: impl Future<Output = std::result::Result<T, E>>) -> Result<T>
    where
        Error: From<E>,
    {
        match timeout(self.store_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.store_timeout).into()),
        }
    }

    /// Listed addresses never touch a bucket. Everyone else is counted,
    /// refused or not.
    pub async fn try_auth(&self, attempt: &Attempt) -> Result<Decision> {
        parse_addr(&attempt.ip)?;

        let decision = self.decide(attempt).await?;

        DECISIONS.with_label_values(&[decision.outcome()]).inc();
        tracing::debug!(
            login = %attempt.login,
            ip = %attempt.ip,
            outcome = decision.outcome(),
            "admission decision"
        );
        Ok(decision)
    }

    async fn decide(&self, attempt: &Attempt) -> Result<Decision> {
        if self
            .bounded(self.lists.contains(ListKind::Blacklist, &attempt.ip))
            .await?
        {
            return Ok(Decision::Blacklisted);
        }
        if self
            .bounded(self.lists.contains(ListKind::Whitelist, &attempt.ip))
            .await?
        {
            return Ok(Decision::Whitelisted);
        }

        let login_key = BucketKind::Login.key(&attempt.login);
        let password_key = BucketKind::Password.key(&attempt.password);
        let ip_key = BucketKind::Ip.key(&attempt.ip);

        // reads sit outside the increment batch, racing attempts can both pass
        let login = self.bounded(self.store.get_int(&login_key)).await?;
        let password = self.bounded(self.store.get_int(&password_key)).await?;
        let ip = self.bounded(self.store.get_int(&ip_key)).await?;

        self.bounded(
            self.store
                .incr_with_ttl(&[login_key.as_str(), password_key.as_str(), ip_key.as_str()], BUCKET_TTL),
        )
        .await?;

        Ok(if self.limits.admits(login, password, ip) {
            Decision::Admitted
        } else {
            Decision::Limited
        })
    }

    /// Clears the login and ip buckets. The password bucket is kept.
    pub async fn reset_buckets(&self, login: &str, ip: &str) -> Result<()> {
        let login_key = BucketKind::Login.key(login);
        let ip_key = BucketKind::Ip.key(ip);
        self.bounded(self.store.delete(&[login_key.as_str(), ip_key.as_str()]))
            .await?;

        tracing::info!(login, ip, "buckets reset");
        Ok(())
    }

    pub async fn add_to_blacklist(&self, network: &str) -> Result<()> {
        self.update_list(ListKind::Blacklist, network, true).await
    }

    pub async fn remove_from_blacklist(&self, network: &str) -> Result<()> {
        self.update_list(ListKind::Blacklist, network, false).await
    }

    pub async fn add_to_whitelist(&self, network: &str) -> Result<()> {
        self.update_list(ListKind::Whitelist, network, true).await
    }

    pub async fn remove_from_whitelist(&self, network: &str) -> Result<()> {
        self.update_list(ListKind::Whitelist, network, false).await
    }

    async fn update_list(&self, kind: ListKind, network: &str, add: bool) -> Result<()> {
        if add {
            self.bounded(self.lists.add(kind, network)).await?;
        } else {
            self.bounded(self.lists.remove(kind, network)).await?;
        }
        tracing::info!(list = %kind, network, added = add, "network list updated");
        Ok(())
    }
}
