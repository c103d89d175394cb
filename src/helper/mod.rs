//! Privileged helper protocol client. The actual privileged process is
//! out of scope here; what's in scope is the narrow request the core
//! sends it and the client obligations: treat any response other than
//! `ok` as a per-item failure, and bound every call with its own timeout
//! independent of the scheduler's default.

pub mod protocol;

use std::path::Path;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::ExecutionMode;

pub use protocol::{DeleteOneRequest, DeleteOneResponse, DeleteOutcome};

/// Default per-path timeout for a helper round trip: 30 s.
pub const DEFAULT_HELPER_TIMEOUT: Duration = Duration::from_secs(30);

/// A client capable of asking the privileged helper to delete one path.
/// Implementations must re-validate nothing themselves — re-validation is
/// the helper's own responsibility — but must treat any non-`Ok` outcome
/// as a failure, never retry internally, and respect the timeout.
#[async_trait::async_trait]
pub trait HelperClient: Send + Sync {
    async fn delete_one(&self, canonical_path: &Path, mode: ExecutionMode) -> Result<()>;
}

/// An in-process test double standing in for the real privileged process:
/// useful for exercising the executor's retry path without a real socket.
/// Not used in production; the real client speaks [`FramedHelperClient`]'s
/// wire protocol over a Unix domain socket to the actual helper.
pub struct LoopbackHelperClient<F> {
    responder: F,
}

impl<F> LoopbackHelperClient<F>
where
    F: Fn(&Path, ExecutionMode) -> DeleteOutcome + Send + Sync,
{
    pub fn new(responder: F) -> Self {
        Self { responder }
    }
}

#[async_trait::async_trait]
impl<F> HelperClient for LoopbackHelperClient<F>
where
    F: Fn(&Path, ExecutionMode) -> DeleteOutcome + Send + Sync,
{
    async fn delete_one(&self, canonical_path: &Path, mode: ExecutionMode) -> Result<()> {
        match (self.responder)(canonical_path, mode) {
            DeleteOutcome::Ok => Ok(()),
            DeleteOutcome::Rejected { reason } => Err(Error::validation(canonical_path, reason)),
            DeleteOutcome::Failed { .. } => Err(Error::permission(canonical_path)),
        }
    }
}

/// Speaks the length-prefixed framing of [`protocol`] over any
/// `AsyncRead + AsyncWrite` channel (a Unix domain socket in production, an
/// in-memory duplex stream in tests). One call is one exchange: write a
/// request frame, read the correlated response frame, bounded by `timeout`.
pub struct FramedHelperClient<T> {
    channel: tokio::sync::Mutex<T>,
    timeout: Duration,
}

impl<T> FramedHelperClient<T>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    pub fn new(channel: T) -> Self {
        Self {
            channel: tokio::sync::Mutex::new(channel),
            timeout: DEFAULT_HELPER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl<T> HelperClient for FramedHelperClient<T>
where
    T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    async fn delete_one(&self, canonical_path: &Path, mode: ExecutionMode) -> Result<()> {
        let request_id = Uuid::new_v4();
        let request = DeleteOneRequest {
            request_id,
            canonical_path: canonical_path.to_path_buf(),
            mode,
        };

        let exchange = async {
            let mut channel = self.channel.lock().await;
            protocol::write_frame(&mut *channel, &request).await?;
            let response: DeleteOneResponse = protocol::read_frame(&mut *channel).await?;
            Ok::<_, std::io::Error>(response)
        };

        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(Error::Io)?;

        if response.request_id != request_id {
            warn!(
                expected = %request_id,
                got = %response.request_id,
                "helper response request id mismatch"
            );
            return Err(Error::permission(canonical_path));
        }

        match response.outcome {
            DeleteOutcome::Ok => Ok(()),
            DeleteOutcome::Rejected { reason } => Err(Error::validation(canonical_path, reason)),
            DeleteOutcome::Failed { .. } => Err(Error::permission(canonical_path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn loopback_client_surfaces_ok() {
        let client = LoopbackHelperClient::new(|_, _| DeleteOutcome::Ok);
        let result = client
            .delete_one(Path::new("/Library/Caches/x"), ExecutionMode::Trash)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn loopback_client_surfaces_failure() {
        let client = LoopbackHelperClient::new(|_, _| DeleteOutcome::Failed {
            message: "denied".to_string(),
        });
        let result = client
            .delete_one(Path::new("/Library/Caches/x"), ExecutionMode::Trash)
            .await;
        assert!(matches!(result, Err(Error::Permission { .. })));
    }

    #[tokio::test]
    async fn framed_client_round_trips_over_duplex_stream() {
        let (client_side, mut server_side) = duplex(8192);
        let client = FramedHelperClient::new(client_side);

        let server = tokio::spawn(async move {
            let request: DeleteOneRequest = protocol::read_frame(&mut server_side).await.unwrap();
            let response = DeleteOneResponse {
                request_id: request.request_id,
                outcome: DeleteOutcome::Ok,
            };
            protocol::write_frame(&mut server_side, &response).await.unwrap();
        });

        let result = client
            .delete_one(Path::new("/Users/x/Library/Caches/blob"), ExecutionMode::Trash)
            .await;
        assert!(result.is_ok());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn framed_client_times_out_when_helper_never_replies() {
        let (client_side, _server_side) = duplex(8192);
        let client = FramedHelperClient::new(client_side).with_timeout(Duration::from_millis(20));

        let result = client
            .delete_one(Path::new("/Users/x/Library/Caches/blob"), ExecutionMode::Trash)
            .await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
