use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

// Every hit pushes the bucket's expiry this far out
pub const BUCKET_TTL: Duration = Duration::from_secs(60);

// Attempts allowed per window for each dimension
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub n: u64, // per login
    pub m: u64, // per password
    pub k: u64, // per ip
}

impl Limits {
    // Counts are read before this attempt is added, so the first `n`
    // attempts (0..n-1 seen) pass and attempt n+1 is the first refused
    pub fn admits(&self, login: u64, password: u64, ip: u64) -> bool {
        login < self.n && password < self.m && ip < self.k
    }
}

// Bucket key namespaces
#[derive(Clone, Copy, Debug)]
pub enum BucketKind {
    Login,
    Password,
    Ip,
}

impl BucketKind {
    pub fn key(self, value: &str) -> String {
        match self {
            BucketKind::Login => format!("login:{value}"),
            // passwords never reach the store in the clear
            BucketKind::Password => {
                let mut hasher = Sha256::new();
                hasher.update(value.as_bytes());
                format!("password:{:x}", hasher.finalize())
            }
            BucketKind::Ip => format!("ip:{value}"),
        }
    }
}
