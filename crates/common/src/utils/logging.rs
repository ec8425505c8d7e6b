use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Default directives when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVES: &str = "info,tower_http=info,axum=info,sqlx=warn";

/// Output shape of the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT` (`json` or anything else for compact).
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Writes to stdout to improve visibility in environments that hide stderr
/// - Safe to call more than once; later calls are no-ops
pub fn init_logging_default() {
    init_logging(LogFormat::from_env());
}

pub fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Compact => {
            let _ = fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .compact()
                .with_writer(io::stdout)
                .try_init();
        }
        LogFormat::Json => {
            let _ = fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .json()
                .with_writer(io::stdout)
                .try_init();
        }
    }
}
