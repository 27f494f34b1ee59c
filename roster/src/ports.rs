#![deny(clippy::all)]

use crate::domain::{CreateEmployeeRequest, Employee};
use crate::planes::control::Compartment;
use async_trait::async_trait;
use futures::future::BoxFuture;
use shared::Result;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

// Ports are the pluggable extension points for the upstream directory and cache storage

/// Port for the external employee directory.
/// Implementations classify every failure into a [`shared::Error`] kind.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync + 'static {
    /// All employees in upstream order. An empty list is a valid answer.
    async fn list_all(&self) -> Result<Vec<Employee>>;
    async fn get_by_id(&self, id: &str) -> Result<Employee>;
    async fn create(&self, request: &CreateEmployeeRequest) -> Result<Employee>;
    async fn delete_by_name(&self, name: &str) -> Result<()>;
}

/// Deferred computation handed to a compartment on miss. Not polled on a hit.
pub type Loader<V> = BoxFuture<'static, Result<V>>;

/// Port for one read-through cache compartment.
#[async_trait]
pub trait CompartmentStore<K, V>: Send + Sync + 'static {
    /// Returns the cached value for `key`, or runs `loader` and caches its success.
    /// Concurrent misses on the same key share a single load.
    async fn get_or_compute(&self, key: K, loader: Loader<V>) -> Result<V>;
    async fn invalidate(&self, key: &K);
    async fn invalidate_all(&self);
}

/// Port for creating compartment storage.
/// This allows different storage backends to be plugged in
pub trait StorageFactory: Send + Sync + 'static {
    fn create_compartment<K, V>(&self, compartment: Compartment) -> Arc<dyn CompartmentStore<K, V>>
    where
        K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
        V: Debug + Clone + Send + Sync + 'static;
}
