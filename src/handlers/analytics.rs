use axum::body::Bytes;
use axum::http::{HeaderMap, header};
use axum::{Json, extract::State};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::metrics::ANALYTICS_EVENTS_INGESTED;
use crate::models::{AnalyticsResponse, ClientInfo};
use crate::rate_limit::{UNKNOWN_CLIENT, client_identifier};
use crate::state::AppState;

fn header_or_unknown(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Split an ingestion body into events and attach `clientInfo` to each.
///
/// `{"events": [...]}` yields the array; any other body is a single event.
/// Non-object events are wrapped as `{"payload": <event>}`.
pub fn enrich_events(body: Value, client: &ClientInfo) -> Vec<Value> {
    let events = match body {
        Value::Object(mut obj) => match obj.remove("events") {
            Some(Value::Array(events)) => events,
            Some(other) => {
                obj.insert("events".to_string(), other);
                vec![Value::Object(obj)]
            }
            None => vec![Value::Object(obj)],
        },
        other => vec![other],
    };

    events
        .into_iter()
        .map(|event| {
            let mut obj = match event {
                Value::Object(obj) => obj,
                other => {
                    let mut wrapped = Map::new();
                    wrapped.insert("payload".to_string(), other);
                    wrapped
                }
            };
            obj.insert("clientInfo".to_string(), json!(client));
            Value::Object(obj)
        })
        .collect()
}

pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        ip: client_identifier(headers),
        user_agent: header_or_unknown(headers, header::USER_AGENT),
        referrer: header_or_unknown(headers, header::REFERER),
    }
}

// POST /api/analytics
// Ingestion is not tracked through the batcher, so a reporting endpoint
// pointing back here cannot feed itself.
pub async fn analytics_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let client = client_info(&headers);

    // our own batches do not spend a visitor's budget
    if !state.is_own_telemetry(&headers) {
        let decision = state.limiter.check(&client.ip);
        if !decision.allowed {
            warn!(client = %client.ip, "Analytics ingestion rate limited");
            return Err(ApiError::RateLimited {
                limit: decision.limit,
            });
        }
    }

    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "Error logging analytics");
        ApiError::Internal("Failed to log analytics")
    })?;

    let events = enrich_events(body, &client);
    let processed = events.len();

    ANALYTICS_EVENTS_INGESTED.inc_by(processed as f64);
    info!(count = processed, "Processed analytics events");
    debug!(events = ?events, "Analytics events");

    Ok(Json(AnalyticsResponse {
        success: true,
        processed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClientInfo {
        ClientInfo {
            ip: "203.0.113.7".to_string(),
            user_agent: "test-agent".to_string(),
            referrer: "unknown".to_string(),
        }
    }

    #[test]
    fn client_info_reads_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "198.51.100.20".parse().unwrap());
        headers.insert(header::USER_AGENT, "Mozilla/5.0 test".parse().unwrap());
        headers.insert(header::REFERER, "https://example.com/".parse().unwrap());

        let info = client_info(&headers);
        assert_eq!(info.ip, "198.51.100.20");
        assert_eq!(info.user_agent, "Mozilla/5.0 test");
        assert_eq!(info.referrer, "https://example.com/");

        assert_eq!(client_info(&HeaderMap::new()), ClientInfo {
            ip: "unknown".to_string(),
            user_agent: "unknown".to_string(),
            referrer: "unknown".to_string(),
        });
    }

    #[test]
    fn batch_body_yields_each_event() {
        let body = json!({"events": [
            {"page": "home", "event": "view"},
            {"page": "projects", "event": "click"}
        ]});
        let events = enrich_events(body, &client());
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["page"], "projects");
        assert_eq!(events[0]["clientInfo"]["ip"], "203.0.113.7");
        assert_eq!(events[0]["clientInfo"]["userAgent"], "test-agent");
        assert_eq!(events[0]["clientInfo"]["referrer"], "unknown");
    }

    #[test]
    fn single_event_body_is_one_event() {
        let events = enrich_events(json!({"page": "home", "event": "view"}), &client());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "view");
    }

    #[test]
    fn non_array_events_field_is_kept_as_single_event() {
        let events = enrich_events(json!({"events": "nope"}), &client());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["events"], "nope");
    }

    #[test]
    fn scalar_events_are_wrapped() {
        let events = enrich_events(json!({"events": [1, "x"]}), &client());
        assert_eq!(events[0]["payload"], 1);
        assert_eq!(events[1]["payload"], "x");
        assert!(events[1]["clientInfo"].is_object());
    }
}
