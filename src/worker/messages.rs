//! Worker protocol types.
//!
//! Requests and responses exchanged between the plugin thread and the
//! parameter worker, serialized as JSON. Requests carry an optional
//! [`TraceContext`] so worker spans join the plugin's trace.

use crate::domain::CurrentSearch;
use crate::params::QueryParams;
use serde::{Deserialize, Serialize};

/// Trace and parent span IDs captured from the active span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the context of the current span, or `None` when it has no
    /// valid OpenTelemetry context (for example when tracing is disabled).
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Defines `WorkerMessage` constructors that capture the active trace.
macro_rules! traced_constructors {
    ($($name:ident => $variant:ident($($arg:ident: $arg_ty:ty),*);)*) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("`", stringify!($variant), "` tagged with the current trace context.")]
                #[must_use]
                pub fn $name($($arg: $arg_ty),*) -> Self {
                    let trace_context = TraceContext::from_current();
                    Self::$variant { $($arg,)* trace_context }
                }
            )*
        }
    };
}

traced_constructors! {
    load_params => LoadParams();
    mirror_search => MirrorSearch(search: CurrentSearch);
    clear_params => ClearParams();
}

/// Requests sent from the plugin to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Read the stored parameters.
    LoadParams {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Merge a submitted search into the stored parameters.
    MirrorSearch {
        search: CurrentSearch,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Forget all stored parameters.
    ClearParams {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::LoadParams { trace_context }
            | Self::MirrorSearch { trace_context, .. }
            | Self::ClearParams { trace_context } => trace_context.as_ref(),
        }
    }
}

/// Responses sent from the worker back to the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// Stored parameters, possibly empty.
    ParamsLoaded { params: QueryParams },

    /// A search was mirrored; carries the parameters after the merge.
    SearchMirrored { params: QueryParams },

    /// Stored parameters were removed.
    ParamsCleared,

    /// The requested operation failed.
    Error { message: String },
}
