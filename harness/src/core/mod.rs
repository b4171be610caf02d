//! Core session logic with no I/O
//!
//! Classification, decoding, rendering and per-session state. The services
//! layer wires these to the network and to subscribers.

pub mod classifier;
pub mod decoder;
pub mod render;
pub mod session;

pub use classifier::{classify, CompletionSentinels};
pub use decoder::Utf8ChunkDecoder;
pub use session::SessionState;
