//! astraeus-stream: insights backend client and event-stream decoder
//!
//! This crate turns the backend's chunked HTTP response into an ordered
//! stream of decoded text payloads. The decoder is boundary-insensitive:
//! a logical line may arrive split across chunks, or several lines may
//! share one chunk, and the decoded output is the same either way.

pub mod client;
pub mod decoder;
pub mod error;

pub use client::{Backend, InsightsClient, PayloadStream};
pub use decoder::decode_data_stream;
pub use error::{Error, Result};
