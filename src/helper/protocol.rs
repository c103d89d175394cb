//! Wire format for the privileged helper protocol: a single
//! request type, `delete_one(canonical_path, mode)`, framed as
//! length-prefixed JSON with a request id for correlation. Transport and
//! authentication are out of scope; this module only (de)serializes
//! frames over anything that is `AsyncRead + AsyncWrite`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use crate::model::ExecutionMode;

/// Maximum frame body size the client/server will accept, guarding against
/// a corrupt or hostile length prefix requesting an unbounded allocation.
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// The one request the core ever sends the helper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOneRequest {
    pub request_id: Uuid,
    pub canonical_path: PathBuf,
    pub mode: ExecutionMode,
}

/// The helper's reply. Any variant other than `Ok` is a per-item failure;
/// the client never treats a non-`ok` response as fatal to the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOneResponse {
    pub request_id: Uuid,
    pub outcome: DeleteOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Ok,
    Rejected { reason: String },
    Failed { message: String },
}

/// Write one length-prefixed JSON frame: a 4-byte big-endian length
/// followed by the JSON body.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> std::io::Result<()>
where
    W: tokio::io::AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(value)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    let len = u32::try_from(body.len())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidData, "frame too large"))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await
}

/// Read one length-prefixed JSON frame, rejecting a length prefix above
/// [`MAX_FRAME_BYTES`] without attempting to allocate it.
pub async fn read_frame<R, T>(reader: &mut R) -> std::io::Result<T>
where
    R: tokio::io::AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "frame exceeds maximum size",
        ));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    serde_json::from_slice(&body).map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn request_round_trips_over_a_duplex_stream() {
        let (mut client, mut server) = duplex(4096);
        let request = DeleteOneRequest {
            request_id: Uuid::new_v4(),
            canonical_path: PathBuf::from("/Users/x/Library/Caches/blob"),
            mode: ExecutionMode::Trash,
        };
        write_frame(&mut client, &request).await.unwrap();
        let received: DeleteOneRequest = read_frame(&mut server).await.unwrap();
        assert_eq!(received.request_id, request.request_id);
        assert_eq!(received.canonical_path, request.canonical_path);
    }

    #[tokio::test]
    async fn response_round_trips_with_correlated_request_id() {
        let (mut client, mut server) = duplex(4096);
        let response = DeleteOneResponse {
            request_id: Uuid::new_v4(),
            outcome: DeleteOutcome::Failed {
                message: "permission denied".to_string(),
            },
        };
        write_frame(&mut server, &response).await.unwrap();
        let received: DeleteOneResponse = read_frame(&mut client).await.unwrap();
        assert_eq!(received.request_id, response.request_id);
        assert_eq!(received.outcome, response.outcome);
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let (mut client, mut server) = duplex(4096);
        client.write_all(&(MAX_FRAME_BYTES + 1).to_be_bytes()).await.unwrap();
        client.flush().await.unwrap();
        let result: std::io::Result<DeleteOneRequest> = read_frame(&mut server).await;
        assert!(result.is_err());
    }
}
