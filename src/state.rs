use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;
use crate::config::Args;
use crate::mailer::{LogMailer, Mailer, WebhookMailer};
use crate::rate_limit::RateLimiter;
use crate::telemetry::{EventBatcher, EventSink, HttpSink, LogSink};
// app's shared state

pub struct AppState {
    pub limiter: Arc<RateLimiter>,     // shared by contact + analytics routes
    pub batcher: Arc<EventBatcher>,    // server-side telemetry
    pub mailer: Arc<dyn Mailer>,
    pub public_dir: PathBuf,           // where project images live
    pub mail_from: String,
    pub mail_to: String,
    pub telemetry_token: String,       // marks this process's own telemetry posts
}

impl AppState {
    // Wire every component from the parsed CLI arguments
    pub fn from_args(args: &Args, client: reqwest::Client) -> Self {
        let telemetry_token = Uuid::new_v4().to_string();

        let sink: Arc<dyn EventSink> = match &args.analytics_endpoint {
            Some(endpoint) => Arc::new(HttpSink::new(
                client.clone(),
                endpoint.clone(),
                telemetry_token.clone(),
            )),
            None => Arc::new(LogSink),
        };
        let mailer: Arc<dyn Mailer> = match &args.mail_relay_url {
            Some(url) => Arc::new(WebhookMailer::new(client, url.clone())),
            None => Arc::new(LogMailer),
        };

        Self {
            limiter: Arc::new(RateLimiter::new(args.limiter_config())),
            batcher: EventBatcher::new(sink, args.mode, args.batcher_config()),
            mailer,
            public_dir: args.public_dir.clone(),
            mail_from: args.mail_from.clone(),
            mail_to: args.mail_to.clone(),
            telemetry_token,
        }
    }

    // True when the request carries this process's telemetry token
    pub fn is_own_telemetry(&self, headers: &axum::http::HeaderMap) -> bool {
        !self.telemetry_token.is_empty()
            && headers
                .get(crate::telemetry::TELEMETRY_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|token| token == self.telemetry_token)
    }
}
