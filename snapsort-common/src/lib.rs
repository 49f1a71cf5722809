//! # SnapSort Common Library
//!
//! Shared code for SnapSort services including:
//! - Error type
//! - TOML configuration model and credential resolution
//! - Classification taxonomy and response types

pub mod config;
pub mod error;
pub mod taxonomy;

pub use error::{Error, Result};
pub use taxonomy::{ClassName, ClassificationResult};
