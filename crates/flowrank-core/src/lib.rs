//! FlowRank Core — chunk data model, envelope decoding, JSON recovery, errors.

pub mod chunk;
pub mod envelope;
pub mod error;
pub mod json;

pub use chunk::{parse_iso_timestamp, Chunk, ChunkSource, SENTINEL_TIMESTAMP};
pub use envelope::decode_chunks;
pub use error::{Error, Result};
