//! In-memory event capture for logging assertions
//!
//! Commit operations run inside a span carrying their `request_id`; captured
//! events are tagged with the request id of the innermost enclosing span that
//! has one, so a test can follow a single commit through its events even when
//! other tests in the same binary log concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::core_types::schema::{FIELD_EVENT, FIELD_OP, FIELD_REQUEST_ID};

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub op: Option<String>,
    pub event: Option<String>,
    /// From the enclosing span, not the event itself
    pub request_id: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

#[derive(Default)]
struct Fields(HashMap<String, String>);

impl Visit for Fields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Span extension holding the span's request id
struct SpanRequestId(String);

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    events: Buffer,
}

fn enclosing_request_id<S>(event: &Event<'_>, ctx: &Context<'_, S>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    for span in ctx.event_scope(event)? {
        let extensions = span.extensions();
        if let Some(SpanRequestId(id)) = extensions.get::<SpanRequestId>() {
            return Some(id.clone());
        }
    }
    None
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        attrs.record(&mut fields);
        if let (Some(request_id), Some(span)) = (fields.0.remove(FIELD_REQUEST_ID), ctx.span(id)) {
            span.extensions_mut().insert(SpanRequestId(request_id));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = Fields::default();
        event.record(&mut fields);
        let fields = fields.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            request_id: enclosing_request_id(event, &ctx),
            fields,
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
    }
}

/// Shared view of everything captured so far
#[derive(Clone)]
pub struct TestCapture {
    events: Buffer,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events matching `predicate`, in emission order
    pub fn find<F>(&self, predicate: F) -> Vec<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().filter(|e| predicate(e)).collect()
    }

    /// All events emitted while serving one request
    pub fn for_request(&self, request_id: &str) -> Vec<CapturedEvent> {
        self.find(|e| e.request_id.as_deref() == Some(request_id))
    }

    /// The `end` event of the commit numbered `commit_id`, if logged
    pub fn commit_end(&self, commit_id: &str) -> Option<CapturedEvent> {
        self.find(|e| {
            e.event.as_deref() == Some(crate::core_types::schema::EVENT_END)
                && e.field(crate::core_types::schema::FIELD_COMMIT_ID) == Some(commit_id)
        })
        .into_iter()
        .next()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (once) and return its handle
///
/// Tests sharing a binary see each other's events; filter by request id or
/// by a commit id no other test produces.
///
/// ```
/// use histograph_core::logging_facility::init_test_capture;
/// use histograph_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// assert!(!capture.find(|e| e.is("doc_capture_op", "start")).is_empty());
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = Buffer::default();
            let layer = CaptureLayer {
                events: Arc::clone(&events),
            };
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { events }
        })
        .clone()
}
