//! Classification taxonomy
//!
//! The four fixed labels an image can be classified into, and the response
//! record returned to API callers.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why the user saved an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassName {
    /// Product information (clothes, cosmetics, ...)
    Shopping,
    /// Readable text such as blog posts or book passages
    Document,
    /// Information about music the user was listening to
    Music,
    /// Anything that fits none of the above
    Other,
}

impl ClassName {
    /// Every label, in prompt order
    pub const ALL: [ClassName; 4] = [
        ClassName::Shopping,
        ClassName::Document,
        ClassName::Music,
        ClassName::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassName::Shopping => "Shopping",
            ClassName::Document => "Document",
            ClassName::Music => "Music",
            ClassName::Other => "Other",
        }
    }

    /// Comma-separated list of allowed labels (for error messages and prompts)
    pub fn allowed_labels() -> String {
        Self::ALL
            .iter()
            .map(ClassName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassName {
    type Err = Error;

    /// Exact, case-sensitive match against the four labels
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|class_name| class_name.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown className '{}' (allowed: {})",
                    s,
                    Self::allowed_labels()
                ))
            })
    }
}

/// Validated classification returned to API callers
///
/// Serialized as `{"className": "<label>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "className")]
    pub class_name: ClassName,
}

impl ClassificationResult {
    pub fn new(class_name: ClassName) -> Self {
        Self { class_name }
    }
}
