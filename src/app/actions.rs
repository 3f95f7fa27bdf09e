//! Side effects requested by the event handler.
//!
//! The handler never talks to the host directly. It returns [`Action`]s and
//! the plugin shim executes them in order.

use crate::catalog::FetchRequest;
use crate::worker::WorkerMessage;

/// Commands executed by the plugin runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hides the plugin pane.
    CloseFocus,

    /// Issues a catalog web request. The request's context carries its
    /// generation so the response can be matched back.
    Fetch(FetchRequest),

    /// Posts a message to the parameter worker.
    PostToWorker(WorkerMessage),
}
