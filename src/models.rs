use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Contact form submission, every field checked by the handler
#[derive(Deserialize, Debug, Default)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

// Request metadata attached to every ingested analytics event
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
    pub referrer: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub processed: usize,
}

// One telemetry observation waiting in the batcher queue
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QueuedEvent {
    pub page: String,
    pub event: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub timestamp: String, // RFC 3339, set at enqueue
}

// Body posted to the reporting endpoint
#[derive(Serialize)]
pub struct EventBatch<'a> {
    pub events: &'a [QueuedEvent],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub image: String,
    pub color: String,
    pub tags: Vec<String>,
    pub link: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCatalog {
    pub projects: Vec<Project>,
    pub images_exist: bool,
    pub timestamp: String,
}
