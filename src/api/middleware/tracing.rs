//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Request tracing for the whole router.
///
/// Every request gets an `INFO` span with method, URI, and version. The
/// response is logged with status and latency; 5xx responses additionally
/// log at `ERROR`.
///
/// ```text
/// INFO request{method=POST uri=/api/entries version=HTTP/1.1}: finished processing request latency=3 ms status=201
/// ```
///
/// Server-sent event connections log their response when the stream opens,
/// not when it closes.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(
            DefaultOnFailure::new()
                .level(Level::ERROR)
                .latency_unit(LatencyUnit::Millis),
        )
}
