//! Foundation types shared across the conch workspace.

pub mod error;

pub use error::{ConchError, Result};
