//! Yahoo Finance API client
//!
//! Supplies the price side of the pipeline: daily close history for the
//! technical indicators, and the 10-year Treasury yield (`^TNX`) used as
//! the risk-free rate proxy in the WACC calculation.

use crate::error::{DataError, Result};
use crate::types::Quote;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Ticker for the CBOE 10-year Treasury yield index (quoted in percent)
const TREASURY_10Y_SYMBOL: &str = "^TNX";

/// Yahoo Finance API client
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get historical daily quotes for a symbol
    pub async fn get_historical_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| DataError::YahooFinanceError(e.to_string()))?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| DataError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooFinanceError(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| Quote {
                symbol: symbol.to_string(),
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
            .collect())
    }

    /// Get historical quotes for a trailing range
    pub async fn get_historical_range(
        &self,
        symbol: &str,
        range: &str, // e.g., "1mo", "1y", "5y"
    ) -> Result<Vec<Quote>> {
        let end = Utc::now();
        let start = match range {
            "5d" => end - chrono::Duration::days(5),
            "1mo" => end - chrono::Duration::days(30),
            "3mo" => end - chrono::Duration::days(90),
            "6mo" => end - chrono::Duration::days(180),
            "1y" => end - chrono::Duration::days(365),
            "2y" => end - chrono::Duration::days(730),
            "5y" => end - chrono::Duration::days(1825),
            _ => {
                return Err(DataError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("Invalid range: {range}"),
                });
            }
        };

        self.get_historical_quotes(symbol, start, end).await
    }

    /// Current 10-year Treasury yield as a fraction (e.g. 0.042 for 4.2%)
    ///
    /// `^TNX` is quoted in percentage points, so the last close is divided
    /// by 100. Callers are expected to substitute their own default when
    /// this lookup fails; a missing risk-free rate never aborts a run.
    pub async fn get_risk_free_rate(&self) -> Result<f64> {
        let quotes = self
            .get_historical_range(TREASURY_10Y_SYMBOL, "5d")
            .await?;

        let last = quotes.last().ok_or_else(|| DataError::DataUnavailable {
            symbol: TREASURY_10Y_SYMBOL.to_string(),
            reason: "No recent yield observations".to_string(),
        })?;

        debug!("10-year Treasury yield: {:.2}%", last.close);
        Ok(last.close / 100.0)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_historical_range() {
        let client = YahooFinanceClient::new();
        let quotes = client.get_historical_range("AAPL", "1mo").await;
        assert!(quotes.is_ok());

        let quotes = quotes.unwrap();
        assert!(!quotes.is_empty());
        assert_eq!(quotes[0].symbol, "AAPL");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_get_risk_free_rate() {
        let client = YahooFinanceClient::new();
        let rate = client.get_risk_free_rate().await.unwrap();

        // A 10-year yield outside (0%, 20%) means the scaling is wrong
        assert!(rate > 0.0 && rate < 0.20);
    }

    #[tokio::test]
    async fn test_invalid_range_rejected() {
        let client = YahooFinanceClient::new();
        let result = client.get_historical_range("AAPL", "7w").await;
        assert!(matches!(result, Err(DataError::DataUnavailable { .. })));
    }
}
