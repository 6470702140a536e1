//! Compact JSON rendering of exported spans.
//!
//! One exported batch becomes one JSON object:
//!
//! ```json
//! {"service":"jobsift","spans":[{"name":"search_request","traceId":"…","spanId":"…",
//!   "parentSpanId":null,"start":"2026-…Z","durationUs":1234,
//!   "attributes":{"seq":3},"events":[{"name":"search results applied","attributes":{}}],
//!   "status":"unset"}]}
//! ```

use chrono::{DateTime, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use serde_json::{json, Map, Value as JsonValue};
use std::time::SystemTime;

#[derive(Debug, Clone)]
pub struct SpanFormatter {
    service: String,
}

impl SpanFormatter {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    #[must_use]
    pub fn format_batch(&self, batch: &[SpanData]) -> JsonValue {
        json!({
            "service": self.service,
            "spans": batch.iter().map(format_span).collect::<Vec<_>>(),
        })
    }
}

fn format_span(span: &SpanData) -> JsonValue {
    let parent = (span.parent_span_id != SpanId::INVALID).then(|| span.parent_span_id.to_string());
    let duration_us = span
        .end_time
        .duration_since(span.start_time)
        .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));

    let events: Vec<JsonValue> = span
        .events
        .iter()
        .map(|event| {
            json!({
                "name": event.name,
                "at": timestamp(event.timestamp),
                "attributes": attributes(&event.attributes),
            })
        })
        .collect();

    json!({
        "name": span.name,
        "traceId": span.span_context.trace_id().to_string(),
        "spanId": span.span_context.span_id().to_string(),
        "parentSpanId": parent,
        "start": timestamp(span.start_time),
        "durationUs": duration_us,
        "attributes": attributes(&span.attributes),
        "events": events,
        "status": status(&span.status),
    })
}

fn timestamp(at: SystemTime) -> String {
    DateTime::<Utc>::from(at).to_rfc3339()
}

fn attributes(kvs: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = kvs
        .iter()
        .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

/// Maps an attribute to the closest JSON value; arrays fall back to text.
fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::I64(i) => JsonValue::from(*i),
        Value::F64(f) => JsonValue::from(*f),
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Array(_) => JsonValue::String(value.to_string()),
    }
}

fn status(status: &Status) -> JsonValue {
    match status {
        Status::Unset => json!("unset"),
        Status::Ok => json!("ok"),
        Status::Error { description } => json!({ "error": description.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_their_json_types() {
        let kvs = [
            KeyValue::new("seq", 3_i64),
            KeyValue::new("job_id", "job-1"),
            KeyValue::new("failed", false),
        ];
        assert_eq!(
            attributes(&kvs),
            json!({ "seq": 3, "job_id": "job-1", "failed": false })
        );
    }

    #[test]
    fn empty_batch_names_the_service() {
        let formatter = SpanFormatter::new("jobsift");
        assert_eq!(formatter.format_batch(&[]), json!({ "service": "jobsift", "spans": [] }));
    }

    #[test]
    fn error_status_carries_description() {
        assert_eq!(
            status(&Status::error("timed out")),
            json!({ "error": "timed out" })
        );
        assert_eq!(status(&Status::Unset), json!("unset"));
    }
}
