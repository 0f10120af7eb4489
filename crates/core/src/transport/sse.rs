//! Server-sent events framing.
//!
//! Bytes are buffered and split on `\n`; `data:` lines accumulate until a
//! blank line ends the frame. Comment lines (`:`) and other fields are
//! skipped.

use bytes::Bytes;
use std::fmt::Display;
use tokio_stream::{Stream, StreamExt};
use tracing::trace;

use super::{RawEventStream, TransportError};

/// Incremental SSE frame splitter.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every frame they completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(idx) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=idx).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(frame) = self.take_frame() {
                    frames.push(frame);
                }
            } else if line.starts_with(':') {
                trace!(comment = line, "sse comment");
            } else if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            } else {
                trace!(line, "sse field ignored");
            }
        }
        frames
    }

    /// Flush a frame left open when the connection ended.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            if let Some(value) = line.trim_end_matches('\r').strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        self.take_frame()
    }

    fn take_frame(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let frame = self.data.join("\n");
        self.data.clear();
        Some(frame)
    }
}

/// Turn a byte stream into a stream of SSE `data` payloads.
pub fn messages<S, E>(bytes: S) -> RawEventStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        tokio::pin!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for frame in decoder.push(&chunk) {
                        yield Ok(frame);
                    }
                }
                Err(err) => {
                    yield Err(TransportError::Stream(err.to_string()));
                    return;
                }
            }
        }

        if let Some(frame) = decoder.finish() {
            yield Ok(frame);
        }
    })
}
