use crate::aggregation::{self, TOP_EARNERS};
use crate::domain::{CreateEmployeeRequest, Employee};
use crate::events::{CompartmentEvent, InvalidatedEvent, InvalidationCause, now_timestamp};
use crate::planes::control::{CompartmentManager, INVALIDATION_GROUP};
use crate::planes::data::operation::EmployeeOperations;
use crate::ports::EmployeeDirectory;
use async_trait::async_trait;
use futures::FutureExt;
use shared::Result;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Application service that orchestrates employee reads and writes
/// Reads go through the compartments; writes go upstream and then invalidate.
#[derive(Clone)]
pub struct EmployeeService {
    directory: Arc<dyn EmployeeDirectory>,
    compartments: CompartmentManager,
    event_broadcaster: Option<broadcast::Sender<CompartmentEvent>>,
}

impl EmployeeService {
    pub fn new(directory: Arc<dyn EmployeeDirectory>, compartments: CompartmentManager) -> Self {
        Self {
            directory,
            compartments,
            event_broadcaster: None,
        }
    }

    pub fn with_event_broadcaster(
        directory: Arc<dyn EmployeeDirectory>,
        compartments: CompartmentManager,
        broadcaster: broadcast::Sender<CompartmentEvent>,
    ) -> Self {
        Self {
            directory,
            compartments,
            event_broadcaster: Some(broadcaster),
        }
    }

    async fn invalidate_after(&self, cause: InvalidationCause, employee_id: Option<&str>) {
        self.compartments.invalidate_group(&INVALIDATION_GROUP).await;
        if let Some(id) = employee_id {
            self.compartments.invalidate_employee(id).await;
        }

        let Some(ref broadcaster) = self.event_broadcaster else {
            return;
        };

        let event = CompartmentEvent::Invalidated(InvalidatedEvent {
            compartments: INVALIDATION_GROUP
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            key: employee_id.map(str::to_string),
            cause,
            timestamp: now_timestamp(),
        });

        match broadcaster.send(event) {
            Ok(subscriber_count) => {
                debug!(
                    "Broadcasted {:?} invalidation to {} subscriber(s)",
                    cause, subscriber_count
                );
            }
            Err(_) => {
                debug!("No subscribers for {:?} invalidation", cause);
            }
        }
    }
}

impl std::fmt::Debug for EmployeeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmployeeService")
            .field("compartments", &self.compartments)
            .field("broadcasting", &self.event_broadcaster.is_some())
            .finish()
    }
}

#[async_trait]
impl EmployeeOperations for EmployeeService {
    async fn get_all(&self) -> Result<Arc<Vec<Employee>>> {
        let directory = Arc::clone(&self.directory);
        let loader = async move {
            debug!("Fetching all employees from directory");
            directory.list_all().await.map(Arc::new)
        }
        .boxed();

        self.compartments
            .all_employees
            .get_or_compute((), loader)
            .await
    }

    async fn search_by_name(&self, fragment: &str) -> Result<Arc<Vec<Employee>>> {
        let key = fragment.to_lowercase();
        let service = self.clone();
        let needle = key.clone();
        let loader = async move {
            debug!("Searching employees by name '{}'", needle);
            service
                .get_all()
                .await
                .map(|employees| Arc::new(aggregation::search_by_name(&employees, &needle)))
        }
        .boxed();

        self.compartments
            .employees_by_name
            .get_or_compute(key, loader)
            .await
    }

    async fn get_by_id(&self, id: &str) -> Result<Employee> {
        let directory = Arc::clone(&self.directory);
        let owned_id = id.to_string();
        let loader = async move {
            debug!("Fetching employee by id '{}'", owned_id);
            directory.get_by_id(&owned_id).await
        }
        .boxed();

        self.compartments
            .employee_by_id
            .get_or_compute(id.to_string(), loader)
            .await
    }

    async fn highest_salary(&self) -> Result<u64> {
        let service = self.clone();
        let loader = async move {
            debug!("Computing highest salary");
            service
                .get_all()
                .await
                .and_then(|employees| aggregation::highest_salary(&employees))
        }
        .boxed();

        self.compartments
            .highest_salary
            .get_or_compute((), loader)
            .await
    }

    async fn top_ten_names(&self) -> Result<Arc<Vec<String>>> {
        let service = self.clone();
        let loader = async move {
            debug!("Computing top {} earners", TOP_EARNERS);
            service
                .get_all()
                .await
                .map(|employees| Arc::new(aggregation::top_n_names(&employees, TOP_EARNERS)))
        }
        .boxed();

        self.compartments
            .top_earner_names
            .get_or_compute((), loader)
            .await
    }

    async fn create(&self, request: CreateEmployeeRequest) -> Result<Employee> {
        info!("Creating employee '{}'", request.name);
        let created = self.directory.create(&request).await.inspect_err(|e| {
            warn!("Create of '{}' failed: {}", request.name, e);
        })?;

        self.invalidate_after(InvalidationCause::Created, None).await;
        Ok(created)
    }

    /// Deletes upstream by the employee's name; the directory has no delete-by-id.
    /// If two employees share a name the directory decides which one goes.
    async fn delete_by_id(&self, id: &str) -> Result<()> {
        info!("Deleting employee with id '{}'", id);
        let employee = self.get_by_id(id).await?;

        self.directory
            .delete_by_name(&employee.name)
            .await
            .inspect_err(|e| {
                warn!("Delete of '{}' ({}) failed: {}", employee.name, id, e);
            })?;

        self.invalidate_after(InvalidationCause::Deleted, Some(id)).await;
        Ok(())
    }
}
