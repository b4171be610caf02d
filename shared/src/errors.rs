//! Shared error types for the load-test harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid subscriber id: {input}")]
    InvalidSubscriberId { input: String },
}
