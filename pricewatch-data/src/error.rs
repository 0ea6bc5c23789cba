use crate::instrument::VenueId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `pricewatch-data`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum DataError {
    #[error("data unavailable from {venue}: {reason}")]
    Unavailable { venue: VenueId, reason: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("chart session already open, close it before opening another")]
    ChartAlreadyOpen,

    #[error("malformed numeric value: {0}")]
    Malformed(String),
}

impl DataError {
    /// Construct a [`DataError::Unavailable`] for the provided venue.
    pub fn unavailable(venue: &VenueId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            venue: venue.clone(),
            reason: reason.into(),
        }
    }

    /// Determine if an error is recovered locally by the next poll tick.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Unavailable { .. } => true,
            DataError::Malformed(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_transient() {
        struct TestCase {
            input: DataError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: is transient w/ DataError::Unavailable
                input: DataError::unavailable(&VenueId::new("binance"), "timeout"),
                expected: true,
            },
            TestCase {
                // TC1: is transient w/ DataError::Malformed
                input: DataError::Malformed("abc".to_string()),
                expected: true,
            },
            TestCase {
                // TC2: is not transient w/ DataError::InvalidSelection
                input: DataError::InvalidSelection("unknown venue".to_string()),
                expected: false,
            },
            TestCase {
                // TC3: is not transient w/ DataError::ChartAlreadyOpen
                input: DataError::ChartAlreadyOpen,
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_transient();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_data_error_display_names_venue() {
        let error = DataError::unavailable(&VenueId::new("okx"), "status 503");
        assert_eq!(error.to_string(), "data unavailable from okx: status 503");
    }
}
