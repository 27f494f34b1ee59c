pub mod compartments;

pub use compartments::{Compartment, CompartmentManager, INVALIDATION_GROUP};
