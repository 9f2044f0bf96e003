//! Shared types for the byline crates.
//!
//! Every crate in the workspace reports failures through [`BylineError`]
//! so that the presentation layer can map them to user-visible outcomes.

pub mod error;

pub use error::{BylineError, Result};
