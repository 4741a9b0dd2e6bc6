//! Open a change request, then close it.

use thiserror::Error;
use tracing::{info, warn};

use crate::client::{ApiResult, ChangeRequestClient};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CloseRecordInput, OpenRecordInput};

/// Both calls succeeded.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub opened_id: String,
    /// Id reported by the close response, when it includes one.
    pub closed_id: Option<String>,
    pub opened: ApiResult,
    pub closed: ApiResult,
}

/// Where the workflow stopped.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Nothing was created.
    #[error(transparent)]
    Open(ApiError),

    #[error("open response did not include a change request id")]
    MissingRecordId(ApiResult),

    /// The record `id` was created and remains open.
    #[error("{source}")]
    Close { id: String, source: ApiError },
}

impl WorkflowError {
    /// Id of a record left open by this failure.
    pub fn open_record_id(&self) -> Option<&str> {
        match self {
            WorkflowError::Close { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Open a record from `open`, then close it with `close`, using the id of
/// the first record in the open response. `close` is only sent after a
/// successful open; a failed close is not rolled back.
pub async fn run_workflow<T: Transport>(
    client: &ChangeRequestClient<T>,
    open: &OpenRecordInput,
    close: &CloseRecordInput,
) -> Result<WorkflowOutcome, WorkflowError> {
    run_workflow_with(client, open, close, |_| {}).await
}

/// Like `run_workflow`, calling `on_opened` with the new record's id as soon
/// as the open call resolves and before close is sent.
pub async fn run_workflow_with<T: Transport>(
    client: &ChangeRequestClient<T>,
    open: &OpenRecordInput,
    close: &CloseRecordInput,
    on_opened: impl FnOnce(&str),
) -> Result<WorkflowOutcome, WorkflowError> {
    let opened = client.open(open).await.map_err(WorkflowError::Open)?;
    let Some(id) = opened.first_record_id() else {
        return Err(WorkflowError::MissingRecordId(opened));
    };
    info!(id = %id, "opened change request");
    on_opened(&id);

    let close = CloseRecordInput {
        id: Some(id.clone()),
        ..close.clone()
    };
    let closed = match client.close(&close).await {
        Ok(closed) => closed,
        Err(source) => {
            warn!(id = %id, error = %source, "close failed, change request left open");
            return Err(WorkflowError::Close { id, source });
        }
    };
    let closed_id = closed.first_record_id();
    info!(id = %id, "closed change request");

    Ok(WorkflowOutcome {
        opened_id: id,
        closed_id,
        opened,
        closed,
    })
}
