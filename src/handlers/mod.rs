mod analytics;
mod contact;
mod health;
mod images;
mod metrics;
mod projects;

pub use analytics::{analytics_handler, enrich_events};
pub use contact::contact_handler;
pub use health::health_handler;
pub use images::images_handler;
pub use metrics::metrics_handler;
pub use projects::projects_handler;
