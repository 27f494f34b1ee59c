//! Pure aggregations over a snapshot of employees.
//!
//! Nothing here touches the network or the cache; callers hand in the data.

use crate::domain::Employee;
use shared::{Error, Result};
use std::cmp::Reverse;

/// Default size of the top earners view.
pub const TOP_EARNERS: usize = 10;

pub fn highest_salary(employees: &[Employee]) -> Result<u64> {
    employees
        .iter()
        .map(|employee| employee.salary)
        .max()
        .ok_or(Error::NoEmployeesToAggregate)
}

/// Names ordered by descending salary, at most `n` of them.
/// Equal salaries keep their upstream order.
pub fn top_n_names(employees: &[Employee], n: usize) -> Vec<String> {
    let mut ranked: Vec<&Employee> = employees.iter().collect();
    // sort_by_key is stable
    ranked.sort_by_key(|employee| Reverse(employee.salary));
    ranked
        .into_iter()
        .take(n)
        .map(|employee| employee.name.clone())
        .collect()
}

/// Case-insensitive substring match on the name. An empty fragment matches everyone.
pub fn search_by_name(employees: &[Employee], fragment: &str) -> Vec<Employee> {
    let needle = fragment.to_lowercase();
    employees
        .iter()
        .filter(|employee| employee.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
