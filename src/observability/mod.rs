//! OpenTelemetry tracing with file export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK provider → FileSpanExporter
//!     → booksearch-otlp.json (rotated at 10 MiB, 3 backups)
//! ```
//!
//! The filter comes from the `trace_level` plugin option and defaults to
//! `info`. The trace file lives in the plugin data directory.
//!
//! ```rust,no_run
//! use booksearch::observability::init_tracing;
//! use booksearch::Config;
//!
//! init_tracing(&Config {
//!     trace_level: Some("booksearch=debug".to_string()),
//!     ..Default::default()
//! });
//! tracing::debug!("tracing is active");
//! ```

mod export;
mod rotation;

pub use export::otlp_batch;
pub use rotation::RotatingFile;

use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service and instrumentation scope name.
pub const SERVICE_NAME: &str = "booksearch";

/// Trace file name inside the data directory.
pub const TRACE_FILE_NAME: &str = "booksearch-otlp.json";

const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber. Later calls are no-ops.
///
/// Tracing is best effort: if the data directory cannot be created or the
/// filter does not parse, the plugin keeps running without traces.
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);
    let Ok(filter) = EnvFilter::try_new(level) else {
        return;
    };

    let data_dir = crate::infrastructure::get_data_dir();
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = export::file_tracer_provider(data_dir.join(TRACE_FILE_NAME), resource, SERVICE_NAME);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)))
        .try_init();
}
