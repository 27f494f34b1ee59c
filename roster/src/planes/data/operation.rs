use crate::domain::{CreateEmployeeRequest, Employee};
use async_trait::async_trait;
use shared::Result;
use std::sync::Arc;

/// Application-level employee operations trait
/// This is the surface consumed by the transport layer
#[async_trait]
pub trait EmployeeOperations: Send + Sync + 'static {
    async fn get_all(&self) -> Result<Arc<Vec<Employee>>>;

    async fn search_by_name(&self, fragment: &str) -> Result<Arc<Vec<Employee>>>;

    async fn get_by_id(&self, id: &str) -> Result<Employee>;

    async fn highest_salary(&self) -> Result<u64>;

    async fn top_ten_names(&self) -> Result<Arc<Vec<String>>>;

    async fn create(&self, request: CreateEmployeeRequest) -> Result<Employee>;

    async fn delete_by_id(&self, id: &str) -> Result<()>;
}
