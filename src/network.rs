use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::store::Store;

// shortest plausible dotted quad, "0.0.0.0"
const MIN_ADDR_LEN: usize = 7;

// dotted quad, packed big-endian
pub fn parse_addr(addr: &str) -> Result<u32> {
    if addr.len() < MIN_ADDR_LEN {
        return Err(Error::invalid_address(addr));
    }

    let mut octets = addr.split('.');
    let mut packed: u32 = 0;
    for _ in 0..4 {
        let octet = octets
            .next()
            .and_then(parse_decimal)
            .filter(|n| *n <= 255)
            .ok_or_else(|| Error::invalid_address(addr))?;
        packed = (packed << 8) | octet;
    }
    if octets.next().is_some() {
        return Err(Error::invalid_address(addr));
    }
    Ok(packed)
}

// Plain ASCII digits only; rejects signs, blanks and anything wider than u32
fn parse_decimal(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

// "a.b.c.d" or "a.b.c.d/prefix", a bare address is a /32
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Network {
    base: u32,
    prefix: u8,
}

impl Network {
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn mask(&self) -> u32 {
        // a shift by 32 overflows, /0 masks nothing
        u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0)
    }

    pub fn contains(&self, addr: u32) -> bool {
        let mask = self.mask();
        self.base & mask == addr & mask
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(entry: &str) -> Result<Self> {
        if entry.len() < MIN_ADDR_LEN {
            return Err(Error::invalid_address(entry));
        }

        let (base, prefix) = match entry.split_once('/') {
            Some((base, prefix)) => {
                let prefix = parse_decimal(prefix)
                    .filter(|p| *p <= 32)
                    .ok_or_else(|| Error::invalid_address(entry))?;
                (base, prefix as u8)
            }
            None => (entry, 32),
        };

        Ok(Self {
            base: parse_addr(base)?,
            prefix,
        })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.base.to_be_bytes();
        write!(f, "{a}.{b}.{c}.{d}/{}", self.prefix)
    }
}

/// Returns whether `addr` falls inside the `network` entry.
pub fn belongs_to_network(network: &str, addr: &str) -> Result<bool> {
    let network: Network = network.parse()?;
    Ok(network.contains(parse_addr(addr)?))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Blacklist,
    Whitelist,
}

impl ListKind {
    pub fn set_name(self) -> &'static str {
        match self {
            ListKind::Blacklist => "blacklist",
            ListKind::Whitelist => "whitelist",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.set_name())
    }
}

/// Named network sets stored as plain members of a store set.
#[derive(Clone)]
pub struct NetworkList {
    store: Arc<dyn Store>,
}

impl NetworkList {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // validated here, remove is not
    pub async fn add(&self, kind: ListKind, entry: &str) -> Result<()> {
        entry.parse::<Network>()?;
        self.store.add_member(kind.set_name(), entry).await?;
        Ok(())
    }

    pub async fn remove(&self, kind: ListKind, entry: &str) -> Result<()> {
        self.store.remove_member(kind.set_name(), entry).await?;
        Ok(())
    }

    pub async fn contains(&self, kind: ListKind, addr: &str) -> Result<bool> {
        let addr = parse_addr(addr)?;
        for entry in self.store.members(kind.set_name()).await? {
            if entry.parse::<Network>()?.contains(addr) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
