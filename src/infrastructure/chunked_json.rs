// Chunked JSON streaming utilities
use crate::application::monitoring_service::StreamMessage;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;
use tokio::io::AsyncReadExt;

pub const CHUNKED_CONTENT_TYPE: &str = "application/x-ndjson-chunked";

/// Create a chunked streaming response. Every chunk is a 4-byte big-endian
/// length followed by one JSON message, Brotli-compressed when requested.
pub fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = StreamMessage> + Send + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    // Chunks are compressed one by one, so the response carries no
    // Content-Encoding header.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CHUNKED_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|e| {
            tracing::error!("Failed to build stream response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

pub(crate) async fn serialize_chunk(msg: &StreamMessage, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = u32::try_from(payload.len()).map_err(std::io::Error::other)?;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

pub(crate) async fn brotli_compress(data: Vec<u8>) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = BrotliEncoder::new(std::io::Cursor::new(data));
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

/// Streaming response fed by a message receiver
pub fn stream_from_receiver(mut rx: tokio::sync::mpsc::Receiver<StreamMessage>, compress: bool) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
