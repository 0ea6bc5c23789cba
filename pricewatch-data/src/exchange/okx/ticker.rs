use super::OKX;
use crate::{
    error::DataError,
    exchange::{datetime_from_epoch_ms, derive_change},
    instrument::VenueId,
    market::Ticker,
};
use serde::{Deserialize, Serialize};

/// [`Okx`](super::Okx) ticker.
///
/// OKX publishes no change fields, so change and percentage are derived from `last` and
/// `open24h`.
///
/// See docs: <https://www.okx.com/docs-v5/en/#order-book-trading-market-data-get-ticker>
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTicker {
    pub inst_id: String,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default, rename = "open24h")]
    pub open_24h: Option<String>,
    #[serde(default, rename = "low24h")]
    pub low_24h: Option<String>,
    pub ts: String,
}

impl TryFrom<OkxTicker> for Ticker {
    type Error = DataError;

    fn try_from(ticker: OkxTicker) -> Result<Self, Self::Error> {
        let venue = VenueId::new(OKX);
        let millis = ticker
            .ts
            .parse::<i64>()
            .map_err(|_| DataError::unavailable(&venue, format!("invalid ts '{}'", ticker.ts)))?;

        let (change, percentage) = derive_change(ticker.last.as_deref(), ticker.open_24h.as_deref());

        Ok(Ticker {
            time: datetime_from_epoch_ms(&venue, millis)?,
            last: ticker.last,
            change,
            percentage,
            low: ticker.low_24h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::okx::OkxResponse;
    use chrono::DateTime;

    #[test]
    fn test_okx_ticker() {
        struct TestCase {
            input: &'static str,
            expected: Result<Ticker, DataError>,
        }

        let tests = vec![
            TestCase {
                // TC0: change fields are derived from open24h
                input: r#"
                    {
                        "code": "0",
                        "msg": "",
                        "data": [
                            {
                                "instType": "SPOT",
                                "instId": "BTC-USDT",
                                "last": "9999.99",
                                "lastSz": "0.1",
                                "open24h": "9000",
                                "high24h": "10000",
                                "low24h": "8888.88",
                                "volCcy24h": "2222",
                                "sodUtc0": "0.1",
                                "ts": "1597026383085"
                            }
                        ]
                    }
                "#,
                expected: Ok(Ticker {
                    time: DateTime::from_timestamp_millis(1597026383085).unwrap(),
                    last: Some("9999.99".to_string()),
                    change: Some("999.99".to_string()),
                    percentage: Some("11.111".to_string()),
                    low: Some("8888.88".to_string()),
                }),
            },
            TestCase {
                // TC1: missing open24h leaves change fields empty
                input: r#"
                    {
                        "code": "0",
                        "data": [{ "instId": "BTC-USDT", "last": "1.5", "ts": "1597026383085" }]
                    }
                "#,
                expected: Ok(Ticker {
                    time: DateTime::from_timestamp_millis(1597026383085).unwrap(),
                    last: Some("1.5".to_string()),
                    change: None,
                    percentage: None,
                    low: None,
                }),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut data = serde_json::from_str::<OkxResponse<OkxTicker>>(test.input)
                .unwrap()
                .data;
            let actual = Ticker::try_from(data.remove(0));
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
