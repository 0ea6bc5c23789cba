use crate::{
    format::format_value,
    instrument::{Symbol, VenueId},
    market::PriceField,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Value published for one [`PriceField`].
#[derive(Copy, Clone, PartialEq, Debug, Deserialize, Serialize)]
pub enum FieldValue {
    Value(f64),
    NoData,
}

impl FieldValue {
    /// Format a raw venue value, degrading to [`FieldValue::NoData`] if it is missing or
    /// malformed.
    pub fn from_raw(raw: Option<&str>) -> Self {
        raw.and_then(|raw| format_value(raw).ok())
            .map_or(FieldValue::NoData, FieldValue::Value)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            FieldValue::Value(value) => Some(*value),
            FieldValue::NoData => None,
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Value(value) => write!(f, "{value}"),
            FieldValue::NoData => write!(f, "no data"),
        }
    }
}

/// User interface surface driven by the synchronization engine.
///
/// All methods are called with the board lock held and must not block.
pub trait Dashboard: Send + 'static {
    fn publish_price(&mut self, field: PriceField, value: FieldValue);

    fn show_info_panel(&mut self);

    fn hide_info_panel(&mut self);

    fn populate_venue_options(&mut self, venues: &[VenueId]);

    fn populate_symbol_options(&mut self, symbols: &[Symbol]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_from_raw() {
        struct TestCase {
            input: Option<&'static str>,
            expected: FieldValue,
        }

        let tests = vec![
            TestCase {
                // TC0: value is truncated for display
                input: Some("123.4567"),
                expected: FieldValue::Value(123.45),
            },
            TestCase {
                // TC1: missing value
                input: None,
                expected: FieldValue::NoData,
            },
            TestCase {
                // TC2: malformed value
                input: Some("NaN?"),
                expected: FieldValue::NoData,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = FieldValue::from_raw(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Value(42000.5).to_string(), "42000.5");
        assert_eq!(FieldValue::NoData.to_string(), "no data");
    }
}
