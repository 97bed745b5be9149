//! Integration tests for the tracing event formatter.
//!
//! Each test installs a scoped subscriber that writes into a shared buffer.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::{info, info_span, warn, Level};
use tracing_subscriber::fmt::MakeWriter;
use transform_encoder::{Entry, Field, RecordSerializer, TransformConfig, TransformEncoder};
use transform_encoder_tracing::TransformFormat;

/// Captures everything the subscriber writes.
#[derive(Clone, Debug, Default)]
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("capture buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_with<S, F>(format: TransformFormat<S>, f: F) -> String
where
    S: RecordSerializer + 'static,
    F: FnOnce(),
{
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_writer(capture.clone())
        .event_format(format)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.output()
}

fn format(template: &str) -> TransformFormat {
    TransformFormat::from_config(TransformConfig {
        template: Some(template.into()),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn renders_message_level_and_target() {
    let out = capture_with(format("{level} {logger} {msg}"), || {
        info!(target: "app::auth", "signed in");
        warn!(target: "app::db", "slow query");
    });
    assert_eq!(out, "info app::auth signed in\nwarn app::db slow query\n");
}

#[test]
fn event_fields_are_placeholders() {
    let out = capture_with(format("{user} {attempts} {admin} {ratio} {missing}"), || {
        info!(user = "john", attempts = 3u64, admin = false, ratio = 0.5, "login");
    });
    assert_eq!(out, "john 3 false 0.5 -\n");
}

#[test]
fn debug_fields_are_strings() {
    let out = capture_with(format("{path}"), || {
        info!(path = ?std::path::Path::new("/tmp/x"), "opened");
    });
    // Debug output of a path is quoted; the escaped quotes are normalized.
    assert_eq!(out, "\"/tmp/x\"\n");
}

#[test]
fn string_escapes_follow_unescape_option() {
    let raw = capture_with(format("{msg}"), || info!("lob\nlaw"));
    assert_eq!(raw, "lob\\nlaw\n");

    let decoded = capture_with(
        TransformFormat::from_config(TransformConfig {
            template: Some("{msg}".into()),
            unescape_strings: true,
            ..Default::default()
        })
        .unwrap(),
        || info!("lob\nlaw"),
    );
    assert_eq!(decoded, "lob\nlaw\n");
}

#[test]
fn span_names_are_listed_root_first() {
    let out = capture_with(format("{spans>[0]}/{spans>[1]} {spans}"), || {
        let _outer = info_span!("request").entered();
        let _inner = info_span!("handler").entered();
        info!("inside");
    });
    assert_eq!(out, "request/handler [\"request\",\"handler\"]\n");
}

#[test]
fn no_spans_field_outside_spans() {
    let out = capture_with(format("{spans}"), || info!("top level"));
    assert_eq!(out, "-\n");
}

#[test]
fn caller_is_file_and_line() {
    let out = capture_with(format("{caller}"), || info!("here"));
    assert!(out.contains("format.rs:"), "unexpected caller: {}", out);
}

#[test]
fn context_fields_from_encoder() {
    let encoder = TransformEncoder::provision(TransformConfig {
        template: Some("{service} {msg}".into()),
        ..Default::default()
    })
    .unwrap()
    .with_field(Field::string("service", "billing"));

    let out = capture_with(TransformFormat::new(encoder), || info!("charged"));
    assert_eq!(out, "billing charged\n");
}

#[derive(Debug, Clone)]
struct Failing;

#[derive(Debug)]
struct Unavailable;

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unavailable")
    }
}

impl std::error::Error for Unavailable {}

impl RecordSerializer for Failing {
    type Error = Unavailable;

    fn encode(&self, _: &Entry, _: &[Field]) -> Result<Vec<u8>, Unavailable> {
        Err(Unavailable)
    }

    fn add_field(&mut self, _: Field) {}
}

#[test]
fn serializer_failure_writes_nothing() {
    let encoder = TransformEncoder::with_serializer(TransformConfig::default(), Failing).unwrap();
    let out = capture_with(TransformFormat::new(encoder), || info!("dropped"));
    assert_eq!(out, "");
}
