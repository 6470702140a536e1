//! Subscriber setup.

use super::file_writer::FileWriter;
use super::tracer;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use std::path::PathBuf;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "jobsift";

/// File name of the trace log inside the data directory.
pub const TRACE_FILE_NAME: &str = "jobsift-traces.json";

/// Installs the global subscriber, exporting spans to
/// `<data dir>/jobsift-traces.json`.
///
/// The filter comes from `config.trace_level`, defaulting to `info`.
/// Returns the trace file path, or `None` if the data directory could not be
/// created or a subscriber was already installed.
pub fn init_tracing(config: &Config) -> Option<PathBuf> {
    let data_dir = crate::infrastructure::get_data_dir();
    std::fs::create_dir_all(&data_dir).ok()?;
    let trace_file = data_dir.join(TRACE_FILE_NAME);

    let level = config.trace_level.as_deref().unwrap_or("info");
    let resource = Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);
    let provider = tracer::create_tracer_provider(FileWriter::new(trace_file.clone()), SERVICE_NAME, resource);

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)))
        .try_init()
        .ok()?;

    Some(trace_file)
}
