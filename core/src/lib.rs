//! Async client core for the change request API.
//!
//! # Overview
//! Opens and closes change request records (also called release logs) on a
//! remote change-management API. The client assembles requests from layered
//! options, sends each one exactly once through a `Transport`, and classifies
//! the JSON response as success or one of a fixed set of failures.
//!
//! # Design
//! - `ChangeRequestClient` is bound to an immutable `ClientConfig`; all
//!   per-call state lives in the `RequestOptions` built for that call.
//! - Defaults are explicit: option and payload types use `Option` fields and
//!   implement `Merge`, so a default only fills a field the caller left unset.
//! - `Transport` is the only I/O seam. `ReqwestTransport` is the production
//!   implementation; tests substitute an in-memory one.
//! - `run_workflow` chains `open` and `close` and reports where it stopped.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod merge;
pub mod telemetry;
pub mod transport;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use client::{ApiResult, ChangeRequestClient, CLOSE_ENDPOINT, OPEN_ENDPOINT};
pub use config::{ClientConfig, ClientOptions};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use merge::Merge;
pub use transport::{ReqwestTransport, Transport};
pub use types::{ChangeRequest, ChangeRequestList, CloseRecordInput, OpenRecordInput};
pub use workflow::{run_workflow, run_workflow_with, WorkflowError, WorkflowOutcome};
