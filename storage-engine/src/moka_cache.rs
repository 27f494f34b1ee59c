use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use moka::future::Cache;
use roster::ports::{CompartmentStore, Loader};
use shared::{Error, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

type SharedLoad<V> = Shared<BoxFuture<'static, Result<V>>>;

struct InflightLoad<V> {
    id: u64,
    load: SharedLoad<V>,
}

/// Loads currently running, at most one per key.
/// A load may populate the cache only while it is still registered here.
struct Inflight<K, V> {
    next_id: u64,
    loads: HashMap<K, InflightLoad<V>>,
}

struct Inner<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    name: String,
    cache: Cache<K, V>,
    inflight: Mutex<Inflight<K, V>>,
}

/// Moka-backed read-through compartment with request coalescing
/// Entries never expire; they leave only through invalidation.
pub struct MokaCompartment<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for MokaCompartment<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> MokaCompartment<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    /// Create an unbounded compartment without TTL
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let cache = Cache::builder().name(&name).build();

        Self {
            inner: Arc::new(Inner {
                name,
                cache,
                inflight: Mutex::new(Inflight {
                    next_id: 0,
                    loads: HashMap::new(),
                }),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Runs `loader` on its own task so a waiter giving up does not cancel it.
    fn spawn_load(&self, key: K, id: u64, loader: Loader<V>) -> SharedLoad<V> {
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(loader).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Internal(format!(
                    "loader for '{}' panicked",
                    inner.name
                ))),
            };

            let mut inflight = inner.inflight.lock().await;
            let registered = inflight
                .loads
                .get(&key)
                .is_some_and(|pending| pending.id == id);

            if registered {
                inflight.loads.remove(&key);
                match &outcome {
                    Ok(value) => inner.cache.insert(key, value.clone()).await,
                    Err(e) => debug!("Load in '{}' for {:?} failed: {}", inner.name, key, e),
                }
            } else {
                debug!(
                    "Load in '{}' for {:?} finished after invalidation, not caching",
                    inner.name, key
                );
            }

            outcome
        });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::Internal(format!("load task failed: {}", e))),
            }
        }
        .boxed()
        .shared()
    }
}

#[async_trait]
impl<K, V> CompartmentStore<K, V> for MokaCompartment<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    async fn get_or_compute(&self, key: K, loader: Loader<V>) -> Result<V> {
        if let Some(value) = self.inner.cache.get(&key).await {
            trace!("Hit in '{}' for {:?}", self.inner.name, key);
            return Ok(value);
        }

        let load = {
            let mut inflight = self.inner.inflight.lock().await;

            // a load may have landed while we waited for the lock
            if let Some(value) = self.inner.cache.get(&key).await {
                return Ok(value);
            }

            let pending = inflight.loads.get(&key).map(|p| p.load.clone());
            match pending {
                Some(load) => {
                    debug!("Joining in-flight load in '{}' for {:?}", self.inner.name, key);
                    load
                }
                None => {
                    debug!("Miss in '{}' for {:?}, loading", self.inner.name, key);
                    let id = inflight.next_id;
                    inflight.next_id += 1;
                    let load = self.spawn_load(key.clone(), id, loader);
                    inflight.loads.insert(
                        key,
                        InflightLoad {
                            id,
                            load: load.clone(),
                        },
                    );
                    load
                }
            }
        };

        load.await
    }

    async fn invalidate(&self, key: &K) {
        let mut inflight = self.inner.inflight.lock().await;
        inflight.loads.remove(key);
        self.inner.cache.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        let mut inflight = self.inner.inflight.lock().await;
        inflight.loads.clear();
        self.inner.cache.invalidate_all();
    }
}

impl<K, V> Debug for MokaCompartment<K, V>
where
    K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
    V: Debug + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCompartment")
            .field("name", &self.inner.name)
            .field("entry_count", &self.inner.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::time::{Duration, sleep};

    fn counted(loads: &Arc<AtomicUsize>, value: &'static str) -> Loader<String> {
        let loads = Arc::clone(loads);
        async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(value.to_string())
        }
        .boxed()
    }

    /// Loader that signals `started` and then waits for `gate`.
    fn gated(
        loads: &Arc<AtomicUsize>,
        started: &Arc<Notify>,
        gate: &Arc<Notify>,
        value: &'static str,
    ) -> Loader<String> {
        let loads = Arc::clone(loads);
        let started = Arc::clone(started);
        let gate = Arc::clone(gate);
        async move {
            loads.fetch_add(1, Ordering::SeqCst);
            started.notify_one();
            gate.notified().await;
            Ok(value.to_string())
        }
        .boxed()
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let compartment = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));

        let first = compartment
            .get_or_compute("key".to_string(), counted(&loads, "value"))
            .await;
        let second = compartment
            .get_or_compute("key".to_string(), counted(&loads, "other"))
            .await;

        assert_eq!(first, Ok("value".to_string()));
        assert_eq!(second, Ok("value".to_string()));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_share_one_load() {
        let compartment: MokaCompartment<(), String> = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));

        let mut callers = Vec::new();
        for _ in 0..16 {
            let compartment = compartment.clone();
            let loads = Arc::clone(&loads);
            callers.push(tokio::spawn(async move {
                let loader = async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(50)).await;
                    Ok("shared".to_string())
                }
                .boxed();
                compartment.get_or_compute((), loader).await
            }));
        }

        for caller in callers {
            assert_eq!(caller.await.unwrap(), Ok("shared".to_string()));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let compartment: MokaCompartment<String, String> = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&loads);
        let failing = async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(Error::NotFound("key".to_string()))
        }
        .boxed();

        let result = compartment.get_or_compute("key".to_string(), failing).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let retried = compartment
            .get_or_compute("key".to_string(), counted(&loads, "value"))
            .await;
        assert_eq!(retried, Ok("value".to_string()));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_drops_one_key() {
        let compartment = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));

        compartment
            .get_or_compute("a".to_string(), counted(&loads, "a1"))
            .await
            .unwrap();
        compartment
            .get_or_compute("b".to_string(), counted(&loads, "b1"))
            .await
            .unwrap();

        compartment.invalidate(&"a".to_string()).await;

        let a = compartment
            .get_or_compute("a".to_string(), counted(&loads, "a2"))
            .await;
        let b = compartment
            .get_or_compute("b".to_string(), counted(&loads, "b2"))
            .await;

        assert_eq!(a, Ok("a2".to_string()));
        assert_eq!(b, Ok("b1".to_string()));
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalidate_all_drops_every_key() {
        let compartment = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));

        for key in ["a", "b", "c"] {
            compartment
                .get_or_compute(key.to_string(), counted(&loads, "old"))
                .await
                .unwrap();
        }

        compartment.invalidate_all().await;

        for key in ["a", "b", "c"] {
            let value = compartment
                .get_or_compute(key.to_string(), counted(&loads, "new"))
                .await;
            assert_eq!(value, Ok("new".to_string()));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_overtaken_by_invalidation_is_not_cached() {
        let compartment: MokaCompartment<String, String> = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let pending = {
            let compartment = compartment.clone();
            let loader = gated(&loads, &started, &gate, "stale");
            tokio::spawn(async move { compartment.get_or_compute("k".to_string(), loader).await })
        };

        started.notified().await;
        compartment.invalidate_all().await;
        gate.notify_one();

        // the waiter still receives what it asked for
        assert_eq!(pending.await.unwrap(), Ok("stale".to_string()));

        let fresh = compartment
            .get_or_compute("k".to_string(), counted(&loads, "fresh"))
            .await;
        assert_eq!(fresh, Ok("fresh".to_string()));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_waiter_does_not_cancel_load() {
        let compartment: MokaCompartment<String, String> = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let first = {
            let compartment = compartment.clone();
            let loader = gated(&loads, &started, &gate, "loaded");
            tokio::spawn(async move { compartment.get_or_compute("k".to_string(), loader).await })
        };

        started.notified().await;
        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());

        let second = {
            let compartment = compartment.clone();
            let loader = counted(&loads, "duplicate");
            tokio::spawn(async move { compartment.get_or_compute("k".to_string(), loader).await })
        };
        gate.notify_one();

        assert_eq!(second.await.unwrap(), Ok("loaded".to_string()));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_loader_surfaces_internal_error() {
        let compartment: MokaCompartment<String, String> = MokaCompartment::new("test");
        let loads = Arc::new(AtomicUsize::new(0));

        let exploding: Loader<String> = async { panic!("boom") }.boxed();
        let result = compartment.get_or_compute("k".to_string(), exploding).await;
        assert!(matches!(result, Err(Error::Internal(_))));

        let retried = compartment
            .get_or_compute("k".to_string(), counted(&loads, "value"))
            .await;
        assert_eq!(retried, Ok("value".to_string()));
    }
}
