//! Human-readable progress strings sent to subscribers
//!
//! The frontend keys its status badges off these prefixes, so the exact
//! text is part of the wire contract.

use crate::error::SessionError;

pub const IN_PROGRESS_PREFIX: &str = "🔄";
pub const COMPLETED_PREFIX: &str = "✅ [완료]";
pub const STREAM_ENDED_PREFIX: &str = "⚠️ [연결 종료]";
pub const ERROR_PREFIX: &str = "ERROR:";

/// `🔄 [진행중 - N개 청크] <text so far>`
pub fn render_progress(chunk_count: u32, accumulated: &str) -> String {
    format!("{IN_PROGRESS_PREFIX} [진행중 - {chunk_count}개 청크] {accumulated}")
}

/// `✅ [완료] <full text>`
pub fn render_completed(accumulated: &str) -> String {
    format!("{COMPLETED_PREFIX} {accumulated}")
}

/// `⚠️ [연결 종료] <full text>`
pub fn render_stream_ended(accumulated: &str) -> String {
    format!("{STREAM_ENDED_PREFIX} {accumulated}")
}

/// `ERROR: <diagnostic>`
pub fn render_failure(error: &SessionError) -> String {
    format!("{ERROR_PREFIX} {error}")
}
