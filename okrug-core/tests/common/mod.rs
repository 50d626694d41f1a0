//! Shared fixtures for the integration tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use okrug_core::{AttributeMatrix, ContiguityGraph, FloorConstraint};
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Path graph 0 - 1 - ... - (n-1).
pub fn line_graph(n: usize) -> ContiguityGraph {
    let edges: Vec<(u32, u32)> = (1..n as u32).map(|i| (i - 1, i)).collect();
    ContiguityGraph::from_edges(n, &edges).expect("line graph edges are in bounds")
}

/// Single-column attribute matrix.
pub fn column(values: &[f64]) -> AttributeMatrix {
    let rows: Vec<Vec<f64>> = values.iter().map(|&v| vec![v]).collect();
    AttributeMatrix::from_rows(rows).expect("finite single-column rows")
}

/// Unit-weight floor with the given threshold.
pub fn unit_floor(n: usize, threshold: f64) -> FloorConstraint {
    FloorConstraint::new(vec![1.0; n], threshold).expect("unit weights are valid")
}

/// Layer installed during tests to capture closed spans, so instrumentation
/// can be asserted deterministically.
#[derive(Clone, Default)]
pub struct SpanLog {
    spans: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

impl SpanLog {
    /// Snapshot of the closed spans as `(name, fields)` pairs, in completion
    /// order.
    pub fn closed(&self) -> Vec<(String, HashMap<String, String>)> {
        self.spans.lock().expect("span log poisoned").clone()
    }
}

struct FieldWriter<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldWriter<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

struct SpanData(String, HashMap<String, String>);

impl<S> Layer<S> for SpanLog
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            let mut fields = HashMap::new();
            attrs.record(&mut FieldWriter(&mut fields));
            let name = attrs.metadata().name().to_owned();
            span.extensions_mut().insert(SpanData(name, fields));
        }
    }

    fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let Some(SpanData(name, fields)) = span.extensions_mut().remove::<SpanData>() else {
            return;
        };
        self.spans
            .lock()
            .expect("span log poisoned")
            .push((name, fields));
    }
}
