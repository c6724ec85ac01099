use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::rate_limit::LimiterConfig;
use crate::telemetry::BatcherConfig;

// Runtime mode - development logs telemetry instead of sending it
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    pub fn is_development(self) -> bool {
        self == RuntimeMode::Development
    }

    // Default log filter when RUST_LOG is not set
    pub fn default_log_filter(self) -> &'static str {
        match self {
            RuntimeMode::Development => "portfolio_gateway=debug,tower_http=debug,info",
            RuntimeMode::Production => "info",
        }
    }
}

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "portfolio-gateway")]
#[command(about = "API server for the portfolio site: contact mailer, analytics and project catalog")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORTFOLIO_PORT", default_value_t = 3000)]
    pub port: u16,

    // Address to bind
    #[arg(long, env = "PORTFOLIO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORTFOLIO_MODE", value_enum, default_value_t = RuntimeMode::Production)]
    pub mode: RuntimeMode,

    // Rate limit max requests per window (per client)
    #[arg(long, default_value_t = 5)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // How often stale throttle records are swept, in seconds
    #[arg(long, default_value_t = 3600)]
    pub sweep_interval: u64,

    // Static assets (project thumbnails, images/)
    #[arg(long, env = "PUBLIC_DIR", default_value = "./public")]
    pub public_dir: PathBuf,

    // Where batched telemetry gets posted. Log only when unset
    #[arg(long, env = "ANALYTICS_ENDPOINT")]
    pub analytics_endpoint: Option<String>,

    // Max events per telemetry flush
    #[arg(long, default_value_t = 10)]
    pub batch_size: usize,

    // Delay before a scheduled flush, in milliseconds
    #[arg(long, default_value_t = 100)]
    pub flush_delay_ms: u64,

    // HTTP mail relay for contact messages. Log only when unset
    #[arg(long, env = "MAIL_RELAY_URL")]
    pub mail_relay_url: Option<String>,

    #[arg(long, env = "EMAIL_USER", default_value = "portfolio@localhost")]
    pub mail_from: String,

    #[arg(long, env = "MAIL_TO", default_value = "owner@localhost")]
    pub mail_to: String,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }

    // Stale cutoff is the window itself, not the sweep interval
    pub fn limiter_config(&self) -> LimiterConfig {
        LimiterConfig {
            limit: self.rate_limit,
            window: self.rate_window(),
            stale_after: self.rate_window(),
        }
    }

    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig {
            batch_size: self.batch_size.max(1),
            flush_delay: self.flush_delay(),
        }
    }
}
