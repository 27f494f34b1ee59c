pub mod aggregation;
pub mod domain;
pub mod events;
pub mod planes;
pub mod ports;

pub use domain::{CreateEmployeeRequest, DeleteEmployeeRequest, Employee};
pub use planes::control::{Compartment, CompartmentManager, INVALIDATION_GROUP};
pub use planes::data::{EmployeeOperations, EmployeeService};
