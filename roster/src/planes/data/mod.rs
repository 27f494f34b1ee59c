pub mod employee_operations;
pub mod operation;

pub use employee_operations::EmployeeService;
pub use operation::EmployeeOperations;
