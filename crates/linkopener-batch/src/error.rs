//! Batch error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("A batch is already running")]
    AlreadyRunning,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Batch worker failed: {0}")]
    Worker(String),
}
