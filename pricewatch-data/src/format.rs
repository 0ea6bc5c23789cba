//! Display formatting of price-like values and chart timestamps.

use crate::{error::DataError, timeframe::Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Number of fractional digits kept for values with a non-zero integer part.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Format a raw numeric string into a display-ready number.
///
/// Values whose integer part is `0` (or `-0`) are returned unmodified so sub-unit prices keep
/// their significant digits. All other values have their fractional part truncated to
/// [`DISPLAY_DECIMALS`] digits.
///
/// This is a display-precision policy: truncation is not statistically correct rounding and
/// callers must not rely on correctly rounded output.
///
/// Input without a decimal point is treated as an integer. Non-numeric input yields
/// [`DataError::Malformed`].
pub fn format_value(raw: &str) -> Result<f64, DataError> {
    let raw = raw.trim();
    let value = parse_decimal(raw)?;

    if value.trunc().is_zero() {
        return raw
            .parse::<f64>()
            .map_err(|_| DataError::Malformed(raw.to_string()));
    }

    value
        .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::ToZero)
        .to_string()
        .parse::<f64>()
        .map_err(|_| DataError::Malformed(raw.to_string()))
}

/// Format a chart point timestamp at a resolution suited to the [`Timeframe`].
pub fn format_timestamp(time: DateTime<Utc>, timeframe: Timeframe) -> String {
    let pattern = match timeframe {
        Timeframe::Minute1 | Timeframe::Hour1 => "%H:%M",
        Timeframe::Day1 => "%Y-%m-%d",
        Timeframe::Month1 => "%Y-%m",
        Timeframe::Year1 => "%Y",
    };

    time.format(pattern).to_string()
}

fn parse_decimal(raw: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| DataError::Malformed(raw.to_string()))
}
