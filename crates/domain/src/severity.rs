//! Fixed severity scale used for every threshold comparison.

use crate::primitives::PrimitiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event.
///
/// The declaration order is the rank order; `Ord` follows [`Severity::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that did not fail.
    Warn,
    /// An operation failed.
    Error,
    /// The process cannot continue.
    Fatal,
}

impl Severity {
    /// Every severity, lowest rank first.
    pub const ALL: [Self; 5] = [Self::Debug, Self::Info, Self::Warn, Self::Error, Self::Fatal];

    /// Numeric rank (1..=5).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warn => 3,
            Self::Error => 4,
            Self::Fatal => 5,
        }
    }

    /// Inverse of [`Severity::rank`].
    #[must_use]
    pub const fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::Debug),
            2 => Some(Self::Info),
            3 => Some(Self::Warn),
            4 => Some(Self::Error),
            5 => Some(Self::Fatal),
            _ => None,
        }
    }

    /// Returns true when an event of this severity passes `threshold`.
    #[must_use]
    pub const fn passes(self, threshold: Self) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Three-letter line label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warn => "WRN",
            Self::Error => "ERR",
            Self::Fatal => "FTL",
        }
    }

    /// Lowercase name, as used in config files and serialized events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true for severities routed to the error stream.
    #[must_use]
    pub const fn is_error_stream(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }

    /// Parse a severity name (case-insensitive, `warning` accepted).
    pub fn parse(input: &str) -> Result<Self, PrimitiveError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "debug" | "dbg" => Ok(Self::Debug),
            "info" | "inf" => Ok(Self::Info),
            "warn" | "warning" | "wrn" => Ok(Self::Warn),
            "error" | "err" => Ok(Self::Error),
            "fatal" | "ftl" => Ok(Self::Fatal),
            _ => Err(PrimitiveError::UnknownSeverity {
                input: input.trim().to_string(),
            }),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = PrimitiveError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ranks_are_fixed() {
        let ranks: Vec<u8> = Severity::ALL.iter().map(|level| level.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        for level in Severity::ALL {
            assert_eq!(Severity::from_rank(level.rank()), Some(level));
        }
        assert_eq!(Severity::from_rank(0), None);
        assert_eq!(Severity::from_rank(6), None);
    }

    #[test]
    fn parse_accepts_aliases() -> Result<(), PrimitiveError> {
        assert_eq!(Severity::parse("WARNING")?, Severity::Warn);
        assert_eq!(" err ".parse::<Severity>()?, Severity::Error);
        assert!(Severity::parse("verbose").is_err());
        Ok(())
    }

    #[test]
    fn threshold_passes_at_and_above() {
        assert!(Severity::Warn.passes(Severity::Debug));
        assert!(Severity::Warn.passes(Severity::Warn));
        assert!(!Severity::Warn.passes(Severity::Error));
    }

    #[test]
    fn error_and_fatal_use_error_stream() {
        let routed: Vec<Severity> = Severity::ALL
            .into_iter()
            .filter(|level| level.is_error_stream())
            .collect();
        assert_eq!(routed, vec![Severity::Error, Severity::Fatal]);
    }

    proptest! {
        #[test]
        fn rank_order_matches_declaration_order(a in 0usize..5, b in 0usize..5) {
            let left = Severity::ALL[a];
            let right = Severity::ALL[b];
            prop_assert_eq!(left.rank() < right.rank(), a < b);
            prop_assert_eq!(left < right, a < b);
        }
    }
}
