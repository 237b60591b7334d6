//! # SalesDash Common Library
//!
//! Shared code for the SalesDash services including:
//! - Error types and result alias
//! - Configuration loading and per-source field layouts
//! - Source enumeration and source-local identifiers
//! - Fixed-point currency parsing
//! - Calendar date parsing for the snapshot timestamp formats
//! - Text normalization helpers

pub mod config;
pub mod dates;
pub mod error;
pub mod money;
pub mod source;
pub mod text;

pub use error::{Error, Result};
pub use source::{Source, SourceId};
