//! Core display-session components.
//!
//! This module contains the pieces a session is built from:
//!
//! - **protocol**: command framing and response parsing for the helper's
//!   semicolon-delimited line protocol
//! - **process**: helper process ownership and the blocking line transport
//! - **session**: high-level session combining process + protocol
//!
//! # Architecture
//!
//! ```text
//! ImageDisplay
//! ├── Transport (line I/O with the helper process)
//! └── protocol (command framing + response parsing)
//! ```

use std::io;

use thiserror::Error;

pub mod process;
pub mod protocol;
pub mod session;

/// Errors surfaced by a display session.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Failed to spawn helper process: {0}")]
    Spawn(#[source] io::Error),

    #[error("Failed to write to helper: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to read from helper: {0}")]
    Read(#[source] io::Error),

    #[error("Malformed response line: {line:?}")]
    Protocol {
        /// The line as received from the helper.
        line: String,
    },
}

pub type Result<T> = std::result::Result<T, DisplayError>;
