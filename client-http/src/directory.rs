use crate::envelope::ApiResponse;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use roster::ports::EmployeeDirectory;
use roster::{CreateEmployeeRequest, DeleteEmployeeRequest, Employee};
use serde::de::DeserializeOwned;
use shared::config::Config;
use shared::{Error, Result};
use tracing::{debug, warn};

/// Employee directory reached over HTTP.
/// Every failure is classified: 404 is `NotFound`, 429 is `RateLimited`,
/// anything else that is not a success is `Upstream`.
#[derive(Clone, Debug)]
pub struct HttpEmployeeDirectory {
    client: Client,
    base_url: Url,
}

impl HttpEmployeeDirectory {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(client, &config.upstream_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::Internal(format!("Invalid directory URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Internal(format!(
                "Directory URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Collection URL with `id` appended as one percent-encoded path segment.
    /// `.` and `..` name no employee and are rejected before any request.
    fn employee_url(&self, id: &str, missing: &str) -> Result<Url> {
        if matches!(id, "" | "." | "..") {
            debug!("get employee: '{}' is not a usable id", id);
            return Err(Error::NotFound(missing.to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Internal(format!("Directory URL '{}' cannot carry a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, operation: &str, missing: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("{} request failed: {}", operation, e);
            Error::Upstream(format!("{} request failed: {}", operation, e))
        })?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => {
                debug!("{}: directory answered 404", operation);
                Err(Error::NotFound(missing.to_string()))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("{}: directory is rate limiting", operation);
                Err(Error::RateLimited)
            }
            status => {
                warn!("{}: directory answered {}", operation, status);
                Err(Error::Upstream(format!("{} returned {}", operation, status)))
            }
        }
    }

    /// Payload of a successful response; `None` when the body or its `data` is absent.
    async fn read_data<T: DeserializeOwned>(response: Response, operation: &str) -> Result<Option<T>> {
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Upstream(format!("{} body unreadable: {}", operation, e)))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&body)
            .map_err(|e| Error::Upstream(format!("malformed {} response: {}", operation, e)))?;

        if let Some(error) = &envelope.error {
            debug!("{}: directory reported '{}'", operation, error);
        }

        Ok(envelope.data)
    }
}

#[async_trait]
impl EmployeeDirectory for HttpEmployeeDirectory {
    async fn list_all(&self) -> Result<Vec<Employee>> {
        let request = self.client.get(self.base_url.clone());
        let response = self.send(request, "list employees", "No employees found.").await?;

        Self::read_data(response, "list employees")
            .await?
            .ok_or_else(|| Error::Upstream("No employees found.".to_string()))
    }

    async fn get_by_id(&self, id: &str) -> Result<Employee> {
        let missing = format!("Employee not found with ID: {}", id);
        let request = self.client.get(self.employee_url(id, &missing)?);
        let response = self.send(request, "get employee", &missing).await?;

        Self::read_data(response, "get employee")
            .await?
            .ok_or(Error::NotFound(missing))
    }

    async fn create(&self, request: &CreateEmployeeRequest) -> Result<Employee> {
        let builder = self.client.post(self.base_url.clone()).json(request);
        let response = self
            .send(builder, "create employee", "Employee resource not found")
            .await?;

        Self::read_data(response, "create employee")
            .await?
            .ok_or(Error::CreateFailed)
    }

    async fn delete_by_name(&self, name: &str) -> Result<()> {
        let builder = self
            .client
            .delete(self.base_url.clone())
            .json(&DeleteEmployeeRequest::from_name(name));
        let missing = format!("Employee not found with name: {}", name);
        self.send(builder, "delete employee", &missing).await?;
        Ok(())
    }
}
