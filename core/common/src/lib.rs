//! Common types shared across Veildrive modules.
//!
//! This module provides the error taxonomy used by every crate in the
//! encryption core, ensuring failures keep their meaning as they cross
//! crate boundaries.

pub mod error;

pub use error::{Error, Result};
