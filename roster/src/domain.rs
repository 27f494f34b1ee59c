use serde::{Deserialize, Serialize};

/// An employee record as held by the upstream directory. Never mutated locally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    #[serde(alias = "employee_name")]
    pub name: String,
    #[serde(alias = "employee_salary")]
    pub salary: u64,
    #[serde(alias = "employee_age")]
    pub age: u32,
    #[serde(alias = "employee_title")]
    pub title: String,
    #[serde(alias = "employee_email", default)]
    pub email: String,
}

/// Body of an upstream create call. Fields are validated before they reach the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub salary: u64,
    pub age: u32,
    pub title: String,
}

impl CreateEmployeeRequest {
    pub fn new(name: impl Into<String>, salary: u64, age: u32, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            salary,
            age,
            title: title.into(),
        }
    }
}

/// Body of an upstream delete call; the directory deletes by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEmployeeRequest {
    pub name: String,
}

impl DeleteEmployeeRequest {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
