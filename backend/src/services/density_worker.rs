//! Off-thread density computation.
//!
//! The caller owns a [`DensityClient`]. Every [`DensityClient::submit`] is
//! tagged with a monotonically increasing sequence number and computed on the
//! blocking pool; [`DensityClient::recv_latest`] only ever yields the response
//! for the most recent submission, so a slow pass superseded by a newer one
//! is silently discarded.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::algorithms::{build_density_maps, DensityConfig, DensityMaps};
use crate::models::TimeDomain;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DensityWorkerError {
    #[error("Density worker has shut down")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct DensityRequest {
    pub seq: u64,
    pub timestamps: Vec<f64>,
    pub domain: TimeDomain,
    pub config: DensityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityResponse {
    pub seq: u64,
    pub maps: DensityMaps,
}

/// Background task dispatching density passes. Aborted on drop.
pub struct DensityWorker {
    task: JoinHandle<()>,
}

impl DensityWorker {
    /// Start the worker on the current tokio runtime.
    pub fn spawn() -> (Self, DensityClient) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(dispatch(request_rx, response_tx));

        let client = DensityClient {
            latest_seq: 0,
            requests: request_tx,
            responses: response_rx,
        };
        (Self { task }, client)
    }
}

impl Drop for DensityWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn dispatch(
    mut requests: mpsc::UnboundedReceiver<DensityRequest>,
    responses: mpsc::UnboundedSender<DensityResponse>,
) {
    while let Some(request) = requests.recv().await {
        let responses = responses.clone();
        tokio::spawn(async move {
            let seq = request.seq;
            let pass = tokio::task::spawn_blocking(move || {
                build_density_maps(&request.timestamps, request.domain, &request.config)
            })
            .await;

            match pass {
                Ok(maps) => {
                    // The client may be gone; nothing left to deliver to.
                    let _ = responses.send(DensityResponse { seq, maps });
                }
                Err(e) => log::error!("density pass {} failed: {}", seq, e),
            }
        });
    }
    log::debug!("density worker stopped");
}

/// Caller-side handle of a [`DensityWorker`].
pub struct DensityClient {
    latest_seq: u64,
    requests: mpsc::UnboundedSender<DensityRequest>,
    responses: mpsc::UnboundedReceiver<DensityResponse>,
}

impl DensityClient {
    /// Queue a density pass; returns its sequence number.
    pub fn submit(
        &mut self,
        timestamps: Vec<f64>,
        domain: TimeDomain,
        config: DensityConfig,
    ) -> Result<u64, DensityWorkerError> {
        let seq = self.latest_seq + 1;
        self.requests
            .send(DensityRequest {
                seq,
                timestamps,
                domain,
                config,
            })
            .map_err(|_| DensityWorkerError::Closed)?;
        self.latest_seq = seq;
        Ok(seq)
    }

    /// Sequence number of the most recent submission, 0 before any.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Wait for the response to the latest submission.
    ///
    /// Responses to older submissions are dropped. Returns `None` once the
    /// worker is gone.
    pub async fn recv_latest(&mut self) -> Option<DensityResponse> {
        loop {
            let response = self.responses.recv().await?;
            if response.seq == self.latest_seq {
                return Some(response);
            }
            log::debug!(
                "dropping stale density response {} (latest {})",
                response.seq,
                self.latest_seq
            );
        }
    }
}
