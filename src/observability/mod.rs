//! Span export to a local trace file.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → SDK provider → FileSpanExporter → jobsift-traces.json
//! ```
//!
//! The filter level comes from `trace_level` in the configuration. The file
//! rotates at 10 MiB and keeps three backups.
//!
//! - [`init`]: subscriber installation
//! - [`tracer`]: provider and file exporter
//! - [`span_formatter`]: JSON rendering of span batches
//! - [`file_writer`]: rotating line writer

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, TRACE_FILE_NAME};
