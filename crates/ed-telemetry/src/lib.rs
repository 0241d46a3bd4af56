//! Logging setup shared by the engagement-dashboard binaries.
//!
//! Everything logs through `tracing`; this crate only decides where the
//! events go and in which format:
//! - **Human-readable** on stderr for the CLI,
//! - **JSON** on stderr for log shippers,
//! - **File** for the interactive terminal section, which owns the screen.

pub mod logging;
