//! Native-messaging transport: each message is a native-endian `u32` byte length followed by
//! that many bytes of UTF-8 JSON.

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::{LinkrotError, Result};
use crate::messaging::{LinkService, Response};

/// Browsers cap host-bound messages at 1 MiB.
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Read one framed message. `Ok(None)` only when the stream ends before the first byte of a
/// new frame; a stream that ends inside a length prefix or a body is an I/O error.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    if reader.read(&mut prefix[..1]).await? == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut prefix[1..]).await?;

    let len = u32::from_ne_bytes(prefix) as usize;
    if len > MAX_MESSAGE_BYTES {
        return Err(LinkrotError::MessageTooLarge {
            len,
            max: MAX_MESSAGE_BYTES,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_MESSAGE_BYTES {
        return Err(LinkrotError::MessageTooLarge {
            len: body.len(),
            max: MAX_MESSAGE_BYTES,
        });
    }

    writer.write_all(&(body.len() as u32).to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Serve requests in arrival order until the reader closes. Returns how many were handled.
///
/// A frame that is not JSON gets an error response and the loop continues; a broken frame
/// (oversized or truncated) ends the loop with an error.
pub async fn run<R, W>(service: &LinkService, mut reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut handled = 0;

    while let Some(frame) = read_message(&mut reader).await? {
        let response = match serde_json::from_slice::<Value>(&frame) {
            Ok(message) => service.handle_value(message).await,
            Err(e) => {
                warn!(error = %e, bytes = frame.len(), "Discarding malformed message");
                Response::error(LinkrotError::InvalidMessage(e.to_string()).to_string())
            }
        };

        write_message(&mut writer, &response).await?;
        handled += 1;
        debug!(handled, "Response sent");
    }

    info!(handled, "Native messaging input closed");
    Ok(handled)
}

pub async fn run_stdio(service: &LinkService) -> Result<usize> {
    run(service, tokio::io::stdin(), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn frame_layout_is_length_then_json() {
        let mut buf = Vec::new();
        write_message(&mut buf, &json!({"a": 1})).await.unwrap();

        let body = br#"{"a":1}"#;
        assert_eq!(&buf[..4], &(body.len() as u32).to_ne_bytes());
        assert_eq!(&buf[4..], body);

        let mut reader = buf.as_slice();
        assert_eq!(read_message(&mut reader).await.unwrap().unwrap(), body.to_vec());
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_input_is_clean_end() {
        let mut reader: &[u8] = &[];
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_length_is_rejected() {
        let prefix = ((MAX_MESSAGE_BYTES + 1) as u32).to_ne_bytes();
        let mut reader: &[u8] = &prefix;
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(matches!(err, LinkrotError::MessageTooLarge { .. }));
    }

    #[tokio::test]
    async fn truncated_length_prefix_is_an_error() {
        for cut in 1..4 {
            let data = 7u32.to_ne_bytes();
            let mut reader = &data[..cut];
            let err = read_message(&mut reader).await.unwrap_err();
            match err {
                LinkrotError::Io(io) => {
                    assert_eq!(io.kind(), std::io::ErrorKind::UnexpectedEof, "cut at {cut}")
                }
                other => panic!("expected Io error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn truncated_body_is_an_error() {
        let mut data = 10u32.to_ne_bytes().to_vec();
        data.extend_from_slice(b"{}");
        let mut reader = data.as_slice();
        assert!(matches!(
            read_message(&mut reader).await,
            Err(LinkrotError::Io(_))
        ));
    }
}
