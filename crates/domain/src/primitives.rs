//! Domain primitives with validated constructors.

use fanlog_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

const DESTINATION_NAME_MAX_LEN: usize = 128;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `DestinationName` is empty after trimming.
    EmptyDestinationName {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `DestinationName` is too long or contains control characters.
    InvalidDestinationName {
        /// Trimmed name that failed validation.
        input: String,
    },
    /// Severity name is not part of the scale.
    UnknownSeverity {
        /// Trimmed input.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyDestinationName { .. } | Self::InvalidDestinationName { .. } => {
                ErrorCode::new("domain", "invalid_destination_name")
            },
            Self::UnknownSeverity { .. } => ErrorCode::new("domain", "unknown_severity"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDestinationName { .. } => {
                formatter.write_str("destination name must be non-empty")
            },
            Self::InvalidDestinationName { input } => write!(
                formatter,
                "destination name must be at most {DESTINATION_NAME_MAX_LEN} printable characters: {input:?}"
            ),
            Self::UnknownSeverity { input } => write!(
                formatter,
                "unknown severity {input:?} (expected debug, info, warn, error, or fatal)"
            ),
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);
        match error {
            PrimitiveError::EmptyDestinationName { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidDestinationName { input }
            | PrimitiveError::UnknownSeverity { input } => envelope.with_metadata("input", input),
        }
    }
}

/// Unique key of a registered destination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DestinationName(Box<str>);

impl DestinationName {
    /// Parse and validate a destination name.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::EmptyDestinationName {
                input_length: raw.len(),
            });
        }
        if trimmed.chars().count() > DESTINATION_NAME_MAX_LEN
            || trimmed.chars().any(char::is_control)
        {
            return Err(PrimitiveError::InvalidDestinationName {
                input: trimmed.to_string(),
            });
        }
        Ok(Self(trimmed.into()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DestinationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl TryFrom<String> for DestinationName {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DestinationName> for String {
    fn from(value: DestinationName) -> Self {
        value.0.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_name_is_trimmed() -> Result<(), PrimitiveError> {
        let name = DestinationName::parse("  console ")?;
        assert_eq!(name.as_str(), "console");
        Ok(())
    }

    #[test]
    fn destination_name_rejects_empty_and_control_chars() {
        assert_eq!(
            DestinationName::parse("   "),
            Err(PrimitiveError::EmptyDestinationName { input_length: 3 })
        );
        assert!(matches!(
            DestinationName::parse("bad\u{7}name"),
            Err(PrimitiveError::InvalidDestinationName { .. })
        ));
        assert!(DestinationName::parse("x".repeat(129)).is_err());
    }

    #[test]
    fn primitive_errors_map_to_envelope_codes() {
        let envelope: ErrorEnvelope = PrimitiveError::UnknownSeverity {
            input: "loud".into(),
        }
        .into();
        assert_eq!(envelope.code, ErrorCode::new("domain", "unknown_severity"));
        assert_eq!(
            envelope.metadata.get("input").map(String::as_str),
            Some("loud")
        );
    }
}
