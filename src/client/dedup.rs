//! In-flight request deduplication.
//!
//! # Responsibilities
//! - Map a dedupe key to the shared pending result of a GET
//! - Let concurrent callers attach instead of issuing a second request
//! - Forget the entry as soon as the request settles
//!
//! # Design Decisions
//! - `DashMap` entry API makes check-then-insert atomic per key
//! - The pending result is a `Shared` future, so every caller observes the
//!   identical `Ok`/`Err`
//! - The owner removes the entry once, when its request task ends

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, Shared};
use serde_json::Value;

use crate::client::request::DedupeKey;
use crate::error::ApiResult;

/// A pending result any number of callers can await.
pub type SharedResult = Shared<BoxFuture<'static, ApiResult<Value>>>;

/// Registry of GET requests currently in flight.
#[derive(Default)]
pub struct InflightRegistry {
    entries: DashMap<DedupeKey, SharedResult>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending result for `key`, if one is in flight.
    pub fn acquire(&self, key: &DedupeKey) -> Option<SharedResult> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Record `pending` as the in-flight result for `key`.
    pub fn register(&self, key: DedupeKey, pending: SharedResult) {
        self.entries.insert(key, pending);
    }

    /// Forget `key`. Returns false if nothing was registered.
    pub fn release(&self, key: &DedupeKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Atomically join the in-flight result for `key`, or register the one
    /// produced by `start`. Returns the result and whether it was joined.
    ///
    /// `start` runs under the key's shard lock and must not touch the registry.
    pub fn join_or_register<F>(&self, key: DedupeKey, start: F) -> (SharedResult, bool)
    where
        F: FnOnce() -> SharedResult,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => (entry.get().clone(), true),
            Entry::Vacant(entry) => {
                let pending = start();
                entry.insert(pending.clone());
                (pending, false)
            }
        }
    }

    /// Number of requests in flight.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for InflightRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflightRegistry")
            .field("in_flight", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ErrorKind};
    use futures_util::FutureExt;
    use serde_json::json;

    fn ready(result: ApiResult<Value>) -> SharedResult {
        async move { result }.boxed().shared()
    }

    #[tokio::test]
    async fn test_acquire_register_release() {
        let registry = InflightRegistry::new();
        let key = DedupeKey::new("/schools/5/drivers", "abc".into());
        assert!(registry.acquire(&key).is_none());

        registry.register(key.clone(), ready(Ok(json!([1]))));
        let pending = registry.acquire(&key).unwrap();
        assert_eq!(pending.await.unwrap(), json!([1]));

        assert!(registry.release(&key));
        assert!(!registry.release(&key));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_join_or_register_starts_once() {
        let registry = InflightRegistry::new();
        let key = DedupeKey::new("/a", "abc".into());

        let (first, joined) = registry.join_or_register(key.clone(), || ready(Ok(json!(1))));
        assert!(!joined);
        let (second, joined) = registry.join_or_register(key.clone(), || panic!("second start"));
        assert!(joined);
        assert_eq!(registry.len(), 1);

        assert_eq!(first.await, second.await);
    }

    #[tokio::test]
    async fn test_shared_failure_is_identical() {
        let registry = InflightRegistry::new();
        let key = DedupeKey::new("/a", "abc".into());
        let err = ApiError::new(ErrorKind::Server, 503);

        let (first, _) = registry.join_or_register(key.clone(), || ready(Err(err.clone())));
        let (second, _) = registry.join_or_register(key.clone(), || unreachable!());
        assert_eq!(first.await.unwrap_err(), err);
        assert_eq!(second.await.unwrap_err(), err);

        registry.release(&key);
        let (third, joined) = registry.join_or_register(key, || ready(Ok(json!("fresh"))));
        assert!(!joined);
        assert_eq!(third.await.unwrap(), json!("fresh"));
    }

    #[test]
    fn test_keys_differ_by_credential() {
        let registry = InflightRegistry::new();
        registry.register(DedupeKey::new("/a", "one".into()), ready(Ok(json!(1))));
        assert!(registry.acquire(&DedupeKey::new("/a", "two".into())).is_none());
    }
}
