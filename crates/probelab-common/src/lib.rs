//! probelab-common — Shared error type used across all probelab crates.

pub mod error;

pub use error::{ProbelabError, Result};
