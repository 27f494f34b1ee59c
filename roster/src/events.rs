use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompartmentEvent {
    Invalidated(InvalidatedEvent),
}

impl CompartmentEvent {
    pub fn compartments(&self) -> &[String] {
        match self {
            CompartmentEvent::Invalidated(e) => &e.compartments,
        }
    }

    pub fn cause(&self) -> InvalidationCause {
        match self {
            CompartmentEvent::Invalidated(e) => e.cause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationCause {
    Created,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidatedEvent {
    /// Compartment names in the order they were cleared
    pub compartments: Vec<String>,
    /// Employee id whose single-entry compartment was also cleared
    pub key: Option<String>,
    pub cause: InvalidationCause,
    pub timestamp: u64,
}

/// Helper to get current timestamp in seconds since UNIX epoch
pub fn now_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = CompartmentEvent::Invalidated(InvalidatedEvent {
            compartments: vec!["GetAllEmployees".to_string()],
            key: None,
            cause: InvalidationCause::Created,
            timestamp: 1,
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "invalidated");
        assert_eq!(value["cause"], "created");
        assert_eq!(value["compartments"][0], "GetAllEmployees");
        assert!(value["key"].is_null());
    }
}
