//! Per-session accumulation state
//!
//! Owned by exactly one runner. Text accumulates in arrival order and the
//! first terminal transition wins; later transitions hand back the same
//! terminal event instead of changing it.

use crate::core::classifier::CompletionSentinels;
use crate::core::render;
use crate::error::SessionError;
use crate::types::{ProgressEvent, SessionStatus};

#[derive(Debug)]
pub struct SessionState {
    session_index: u32,
    accumulated: String,
    chunk_count: u32,
    terminal: Option<ProgressEvent>,
}

impl SessionState {
    pub fn new(session_index: u32) -> Self {
        Self {
            session_index,
            accumulated: String::new(),
            chunk_count: 0,
            terminal: None,
        }
    }

    pub fn session_index(&self) -> u32 {
        self.session_index
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn chunk_count(&self) -> u32 {
        self.chunk_count
    }

    pub fn status(&self) -> SessionStatus {
        self.terminal
            .as_ref()
            .map(|event| event.status)
            .unwrap_or(SessionStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Feed one decoded chunk
    ///
    /// Returns `None` for empty chunks and once the session is terminal.
    /// Otherwise returns a `Running` event, or the `CompletedBySentinel`
    /// terminal event when the chunk carries a sentinel.
    pub fn accept_chunk(&mut self, chunk: &str, sentinels: &CompletionSentinels) -> Option<ProgressEvent> {
        if chunk.is_empty() || self.is_terminal() {
            return None;
        }

        self.accumulated.push_str(chunk);
        self.chunk_count += 1;

        if sentinels.matches(chunk) {
            let text = render::render_completed(&self.accumulated);
            return Some(self.terminate(SessionStatus::CompletedBySentinel, text));
        }

        Some(ProgressEvent {
            session_index: self.session_index,
            status: SessionStatus::Running,
            rendered_text: render::render_progress(self.chunk_count, &self.accumulated),
            chunk_count: self.chunk_count,
        })
    }

    /// The stream closed without any sentinel
    pub fn finish_stream(&mut self) -> ProgressEvent {
        let text = render::render_stream_ended(&self.accumulated);
        self.terminate(SessionStatus::CompletedByStreamEnd, text)
    }

    /// Timeout or transport failure
    pub fn fail(&mut self, error: &SessionError) -> ProgressEvent {
        let text = render::render_failure(error);
        self.terminate(SessionStatus::Failed, text)
    }

    fn terminate(&mut self, status: SessionStatus, rendered_text: String) -> ProgressEvent {
        if let Some(existing) = &self.terminal {
            return existing.clone();
        }
        let event = ProgressEvent {
            session_index: self.session_index,
            status,
            rendered_text,
            chunk_count: self.chunk_count,
        };
        self.terminal = Some(event.clone());
        event
    }
}
