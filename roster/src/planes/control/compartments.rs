use crate::domain::Employee;
use crate::ports::{CompartmentStore, StorageFactory};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Named cache compartments, one per cached logical operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compartment {
    AllEmployees,
    EmployeesByName,
    EmployeeById,
    HighestSalary,
    TopEarnerNames,
}

impl Compartment {
    pub const fn name(&self) -> &'static str {
        match self {
            Compartment::AllEmployees => "GetAllEmployees",
            Compartment::EmployeesByName => "GetAllEmployeesByName",
            Compartment::EmployeeById => "GetEmployeeById",
            Compartment::HighestSalary => "GetHighestSalary",
            Compartment::TopEarnerNames => "GetTopTenSalaryName",
        }
    }
}

/// Every compartment derived from the full employee list.
/// The source comes first: clearing it before the derived views means a view
/// recomputed after its own clear can only read a fresh list.
pub const INVALIDATION_GROUP: [Compartment; 4] = [
    Compartment::AllEmployees,
    Compartment::EmployeesByName,
    Compartment::HighestSalary,
    Compartment::TopEarnerNames,
];

pub type EmployeeList = Arc<Vec<Employee>>;
pub type NameList = Arc<Vec<String>>;

/// Owns one store per compartment and knows how to clear them.
#[derive(Clone)]
pub struct CompartmentManager {
    pub(crate) all_employees: Arc<dyn CompartmentStore<(), EmployeeList>>,
    pub(crate) employees_by_name: Arc<dyn CompartmentStore<String, EmployeeList>>,
    pub(crate) employee_by_id: Arc<dyn CompartmentStore<String, Employee>>,
    pub(crate) highest_salary: Arc<dyn CompartmentStore<(), u64>>,
    pub(crate) top_earner_names: Arc<dyn CompartmentStore<(), NameList>>,
}

impl Debug for CompartmentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompartmentManager")
            .field("compartments", &"<dyn CompartmentStore x5>")
            .finish()
    }
}

impl CompartmentManager {
    pub fn new<F: StorageFactory>(factory: &F) -> Self {
        Self {
            all_employees: factory.create_compartment(Compartment::AllEmployees),
            employees_by_name: factory.create_compartment(Compartment::EmployeesByName),
            employee_by_id: factory.create_compartment(Compartment::EmployeeById),
            highest_salary: factory.create_compartment(Compartment::HighestSalary),
            top_earner_names: factory.create_compartment(Compartment::TopEarnerNames),
        }
    }

    /// Clears every entry of each listed compartment, in the order given.
    pub async fn invalidate_group(&self, compartments: &[Compartment]) {
        for compartment in compartments {
            self.invalidate_all(*compartment).await;
        }
    }

    pub async fn invalidate_all(&self, compartment: Compartment) {
        debug!("Invalidating compartment '{}'", compartment.name());
        match compartment {
            Compartment::AllEmployees => self.all_employees.invalidate_all().await,
            Compartment::EmployeesByName => self.employees_by_name.invalidate_all().await,
            Compartment::EmployeeById => self.employee_by_id.invalidate_all().await,
            Compartment::HighestSalary => self.highest_salary.invalidate_all().await,
            Compartment::TopEarnerNames => self.top_earner_names.invalidate_all().await,
        }
    }

    /// Clears the single-entity entry for `id` only.
    pub async fn invalidate_employee(&self, id: &str) {
        debug!(
            "Invalidating '{}' entry for id '{}'",
            Compartment::EmployeeById.name(),
            id
        );
        self.employee_by_id.invalidate(&id.to_string()).await;
    }
}
