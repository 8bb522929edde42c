//! Optional memoization in front of the analysis operations.
//!
//! Values are stored as CBOR bytes under a key hashed from the operation
//! name, the input texts and the parameters. Every operation gives the same
//! answer with or without a cache.

use std::{fmt, hash::Hasher};

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{trace, warn};
use twox_hash::XxHash64;

use crate::error::Result;

/// Stable xxHash64 digest identifying one computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Digest of `op`, every text and every parameter.
    ///
    /// Each piece is length-prefixed, so `["ab", "c"]` and `["a", "bc"]` get
    /// different keys.
    pub fn derive<S>(op: &str, texts: &[S], params: &[String]) -> Self
    where
        S: AsRef<str>,
    {
        let mut hasher = XxHash64::with_seed(0);
        write_piece(&mut hasher, op);
        hasher.write_u64(texts.len() as u64);
        for text in texts {
            write_piece(&mut hasher, text.as_ref());
        }
        hasher.write_u64(params.len() as u64);
        for param in params {
            write_piece(&mut hasher, param);
        }
        CacheKey(hasher.finish())
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[inline]
fn write_piece(hasher: &mut XxHash64, piece: &str) {
    hasher.write_u64(piece.len() as u64);
    hasher.write(piece.as_bytes());
}

/// Key/value store consulted before computing
pub trait MemoCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>>;
    fn set(&self, key: CacheKey, value: Vec<u8>);
}

/// Process-local cache backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<CacheKey, Vec<u8>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl MemoCache for InMemoryCache {
    fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: CacheKey, value: Vec<u8>) {
        self.entries.insert(key, value);
    }
}

/// Return the cached value for `key` or compute and store it.
/// Entries that fail to decode count as misses and are overwritten.
pub fn memoize<T, F>(cache: Option<&dyn MemoCache>, key: CacheKey, compute: F) -> T
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let cache = match cache {
        Some(cache) => cache,
        None => return compute(),
    };
    if let Some(hit) = lookup(cache, &key) {
        return hit;
    }
    let value = compute();
    store(cache, key, &value);
    value
}

/// `memoize` for fallible computations; errors are not cached
pub fn try_memoize<T, F>(cache: Option<&dyn MemoCache>, key: CacheKey, compute: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    let cache = match cache {
        Some(cache) => cache,
        None => return compute(),
    };
    if let Some(hit) = lookup(cache, &key) {
        return Ok(hit);
    }
    let value = compute()?;
    store(cache, key, &value);
    Ok(value)
}

fn lookup<T>(cache: &dyn MemoCache, key: &CacheKey) -> Option<T>
where
    T: DeserializeOwned,
{
    let bytes = cache.get(key)?;
    match serde_cbor::from_slice(&bytes) {
        Ok(value) => {
            trace!(key = %key, "cache hit");
            Some(value)
        }
        Err(err) => {
            warn!(key = %key, error = %err, "undecodable cache entry, recomputing");
            None
        }
    }
}

fn store<T>(cache: &dyn MemoCache, key: CacheKey, value: &T)
where
    T: Serialize,
{
    match serde_cbor::to_vec(value) {
        Ok(bytes) => cache.set(key, bytes),
        Err(err) => warn!(key = %key, error = %err, "failed to encode value for cache"),
    }
}
