use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};


lazy_static! {
    pub static ref CONTACT_SUBMISSIONS: Counter = register_counter!(
        "portfolio_contact_submissions_total",
        "Contact messages handed to the mailer"
    )
    .unwrap();
    pub static ref MAIL_FAILURES: Counter =
        register_counter!("portfolio_mail_failures_total", "Contact messages the mailer failed to send").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("portfolio_rate_limited_total", "Requests denied by the throttle").unwrap();
    pub static ref THROTTLE_ENTRIES: Gauge =
        register_gauge!("portfolio_throttle_entries", "Clients currently tracked by the throttle").unwrap();
    pub static ref ANALYTICS_EVENTS_INGESTED: Counter = register_counter!(
        "portfolio_analytics_events_ingested_total",
        "Analytics events accepted by the ingestion endpoint"
    )
    .unwrap();
    pub static ref EVENTS_TRACKED: Counter = register_counter!(
        "portfolio_telemetry_events_tracked_total",
        "Telemetry events queued for batching"
    )
    .unwrap();
    pub static ref BATCHES_DELIVERED: Counter = register_counter!(
        "portfolio_telemetry_batches_delivered_total",
        "Telemetry batches accepted by the sink"
    )
    .unwrap();
    pub static ref BATCHES_DROPPED: Counter = register_counter!(
        "portfolio_telemetry_batches_dropped_total",
        "Telemetry batches lost to a failed delivery"
    )
    .unwrap();
    pub static ref EVENTS_DROPPED: Counter = register_counter!(
        "portfolio_telemetry_events_dropped_total",
        "Telemetry events lost to a failed delivery"
    )
    .unwrap();
}
