//! Event-stream decoder
//!
//! The backend streams UTF-8 text framed as newline-separated lines. A line
//! of interest has the literal prefix `data: ` followed by a JSON object
//! with a string `content` field; everything else is noise and is skipped.
//! Chunk boundaries carry no meaning: the decoder buffers bytes until a
//! full line is available, so a line split across chunks (even inside a
//! multi-byte character) decodes identically to one delivered whole.

use async_stream::stream;
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;

use crate::error::Result;

/// Prefix marking a line that carries a payload frame.
const DATA_PREFIX: &str = "data: ";

/// Body of a `data: ` line.
#[derive(Debug, Deserialize)]
struct DataFrame {
    content: Option<String>,
}

/// Extract the payload from a single line, if it carries one.
///
/// Returns `None` for anything that is not a well-formed frame: wrong
/// prefix, unparseable JSON, a missing `content` field, or a `content`
/// that is not a string. Skipping is silent by contract; the stream must
/// never abort over a bad line.
fn parse_data_line(line: &str) -> Option<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let body = line.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<DataFrame>(body) {
        Ok(DataFrame {
            content: Some(content),
        }) => Some(content),
        Ok(DataFrame { content: None }) => {
            tracing::trace!("skipping frame without content field");
            None
        }
        Err(e) => {
            tracing::trace!("skipping malformed frame: {}", e);
            None
        }
    }
}

/// Decode a stream of raw byte chunks into a stream of text payloads.
///
/// Output is lazy, ordered, and finite: end of the byte stream is normal
/// termination, with a final unterminated line processed as if it were
/// newline-terminated. A transport error from the byte stream is yielded
/// as the last item, after which the decoder produces nothing further.
pub fn decode_data_stream<S>(bytes: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = Result<Bytes>>,
{
    stream! {
        let mut buf: Vec<u8> = Vec::new();
        let mut bytes = std::pin::pin!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    buf.extend_from_slice(&chunk);
                    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buf.drain(..=pos).collect();
                        let line = String::from_utf8_lossy(&line_bytes[..pos]);
                        if let Some(payload) = parse_data_line(&line) {
                            yield Ok(payload);
                        }
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        // The last line may arrive without a trailing newline.
        if !buf.is_empty() {
            let line = String::from_utf8_lossy(&buf);
            if let Some(payload) = parse_data_line(&line) {
                yield Ok(payload);
            }
        }
    }
}
