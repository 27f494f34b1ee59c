use serde::Deserialize;

/// Envelope every directory endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub status: Option<String>,
    pub error: Option<String>,
}
