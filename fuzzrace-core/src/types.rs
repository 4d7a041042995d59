// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Maximum length of a variant identifier.
const MAX_VARIANT_ID_LEN: usize = 64;

/// Validated variant identifier.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 64 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantId(String);

impl VariantId {
    /// Create a new VariantId with validation.
    pub fn new(id: impl Into<String>) -> Result<Self, HardValidationError> {
        let id = id.into();

        if id.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "variant_id",
                value: id,
                reason: "Variant ID cannot be empty".to_string(),
            });
        }

        if id.len() > MAX_VARIANT_ID_LEN {
            return Err(HardValidationError::InvalidFieldValue {
                field: "variant_id",
                value: id.clone(),
                reason: format!(
                    "Variant ID too long: {} chars (max {})",
                    id.len(),
                    MAX_VARIANT_ID_LEN
                ),
            });
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "variant_id",
                value: id,
                reason: "Variant ID must contain only alphanumeric characters, hyphens, and underscores".to_string(),
            });
        }

        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for VariantId {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VariantId> for String {
    fn from(id: VariantId) -> Self {
        id.0
    }
}

/// Name of an executable looked up on `PATH` (interpreter, compiler, build tool).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    /// Create a new ToolName. Must be non-empty and free of whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "tool",
                value: name,
                reason: "Tool name cannot be empty".to_string(),
            });
        }

        if name.chars().any(char::is_whitespace) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "tool",
                value: name,
                reason: "Tool name must be a single executable, pass arguments separately"
                    .to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ToolName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_id_valid() {
        assert!(VariantId::new("python").is_ok());
        assert!(VariantId::new("rust_release").is_ok());
        assert!(VariantId::new("c-O2").is_ok());
    }

    #[test]
    fn test_variant_id_invalid() {
        assert!(VariantId::new("").is_err());
        assert!(VariantId::new("a".repeat(65)).is_err());
        assert!(VariantId::new("c++").is_err());
        assert!(VariantId::new("java script").is_err());
    }

    #[test]
    fn test_tool_name() {
        assert!(ToolName::new("python3").is_ok());
        assert!(ToolName::new("/usr/bin/gcc").is_ok());
        assert!(ToolName::new("").is_err());
        assert!(ToolName::new("cargo run").is_err());
    }
}
