use serde::{Deserialize, Serialize};

use crate::shell::NavItem;

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub environment: String,
    /// Passed through as the raw `DEBUG` string, e.g. `"False"`
    pub debug: String,
}

impl HealthStatus {
    pub fn healthy(environment: &str, debug: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            environment: environment.to_string(),
            debug: debug.to_string(),
        }
    }
}

/// A sample record returned by `GET /api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleItem {
    pub id: u32,
    pub name: String,
    pub value: i64,
}

/// Body of `GET /api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse {
    pub message: String,
    pub items: Vec<SampleItem>,
}

impl DataResponse {
    pub fn sample() -> Self {
        Self {
            message: "Sample data from the capacity backend".to_string(),
            items: sample_items(),
        }
    }
}

pub fn sample_items() -> Vec<SampleItem> {
    (1..=3)
        .map(|id| SampleItem {
            id,
            name: format!("Item {}", id),
            value: i64::from(id) * 100,
        })
        .collect()
}

/// Body of `GET /api/navigation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResponse {
    pub items: Vec<NavItem>,
}
