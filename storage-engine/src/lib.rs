mod moka_cache;

pub use moka_cache::MokaCompartment;

use roster::planes::control::Compartment;
use roster::ports::{CompartmentStore, StorageFactory};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Storage factory that backs every compartment with an unbounded Moka cache
#[derive(Clone, Copy, Debug, Default)]
pub struct MokaStorageFactory;

impl StorageFactory for MokaStorageFactory {
    fn create_compartment<K, V>(&self, compartment: Compartment) -> Arc<dyn CompartmentStore<K, V>>
    where
        K: Debug + Hash + Eq + Clone + Send + Sync + 'static,
        V: Debug + Clone + Send + Sync + 'static,
    {
        tracing::debug!("Creating Moka compartment '{}'", compartment.name());
        Arc::new(MokaCompartment::<K, V>::new(compartment.name()))
    }
}
