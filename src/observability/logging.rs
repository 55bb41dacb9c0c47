//! Structured logging.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to
//! this crate and `tower_http`. Output is pretty for development or JSON
//! lines for aggregation.

use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, ObservabilityConfig};

pub use tracing_subscriber::util::TryInitError;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    format!("form_relay={level},tower_http={level}")
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    build_subscriber(config.log_format, filter, std::io::stdout).try_init()
}

/// Assemble the filter and the formatting layer for `format`, writing to `writer`.
pub fn build_subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (json, pretty) = match format {
        LogFormat::Json => (Some(fmt::layer().json().with_writer(writer)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_writer(writer))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
}

/// Render an error and all of its sources on one line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("DEBUG"), "form_relay=debug,tower_http=debug");
    }

    #[derive(Clone, Default)]
    struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_format_emits_one_object_per_event() {
        let captured = CapturedWriter::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(
            LogFormat::Json,
            EnvFilter::new(default_directive("info")),
            move || writer.clone(),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(request_id = "req-1", status = 200u16, "Form relayed");
            tracing::debug!("filtered out");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1, "unexpected output: {output}");

        let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "Form relayed");
        assert_eq!(event["fields"]["request_id"], "req-1");
        assert_eq!(event["fields"]["status"], 200);
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let rendered = error_chain(&RelayError::UpstreamResponseParse(source));
        assert!(rendered.starts_with("upstream response is not valid JSON: "));
        assert!(rendered.len() > "upstream response is not valid JSON: ".len());
    }
}
