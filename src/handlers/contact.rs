use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::{Json, extract::State};
use serde_json::{Map, json};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::mailer::{ContactMessage, is_valid_email};
use crate::metrics::{CONTACT_SUBMISSIONS, MAIL_FAILURES};
use crate::models::{ContactRequest, ContactResponse};
use crate::rate_limit::client_identifier;
use crate::state::AppState;

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

fn rejected(state: &AppState, reason: &str) {
    let mut meta = Map::new();
    meta.insert("reason".to_string(), json!(reason));
    state.batcher.track("contact", "rejected", meta);
}

// POST /api/contact
pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContactResponse>, ApiError> {
    let client = client_identifier(&headers);
    let decision = state.limiter.check(&client);
    if !decision.allowed {
        warn!(client = %client, "Contact form rate limited");
        return Err(ApiError::RateLimited {
            limit: decision.limit,
        });
    }

    let request: ContactRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Malformed contact request body");
        rejected(&state, "malformed");
        ApiError::Validation("Invalid request body".to_string())
    })?;

    let (Some(name), Some(email), Some(message)) = (
        required(request.name),
        required(request.email),
        required(request.message),
    ) else {
        rejected(&state, "missing_fields");
        return Err(ApiError::Validation(
            "Name, email, and message are required".to_string(),
        ));
    };

    if !is_valid_email(&email) {
        rejected(&state, "invalid_email");
        return Err(ApiError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }

    let mail = ContactMessage::compose(&state.mail_from, &state.mail_to, &name, &email, &message);
    CONTACT_SUBMISSIONS.inc();

    if let Err(e) = state.mailer.send(&mail).await {
        MAIL_FAILURES.inc();
        error!(error = %e, "Error sending contact email");
        return Err(ApiError::Internal(
            "Failed to send message. Please try again later.",
        ));
    }

    info!(from = %email, "Contact email sent");
    state.batcher.track("contact", "submitted", Map::new());

    Ok(Json(ContactResponse {
        success: true,
        message: "Your message has been sent successfully!".to_string(),
    }))
}
