//! Trailing-window technical indicators
//!
//! Simple moving averages (50 and 200 day), a 14-period RSI, and 20-day
//! Bollinger Bands (2 sample standard deviations), all computed over
//! daily closes. Every column is
//! aligned index-for-index with the input closes; positions inside the
//! warmup window are `None`. Each value only looks backward, so the
//! series can be truncated at any point without changing earlier rows.
//!
//! The RSI here averages raw gains and losses over the trailing window
//! (a plain rolling mean, not Wilder smoothing). A window with no losses
//! reads exactly 100, including a perfectly flat series.

use serde::Serialize;

pub const SMA_SHORT_WINDOW: usize = 50;
pub const SMA_LONG_WINDOW: usize = 200;
pub const RSI_WINDOW: usize = 14;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// Indicator columns aligned with the input close series
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    pub closes: Vec<f64>,
    pub sma_50: Vec<Option<f64>>,
    pub sma_200: Vec<Option<f64>>,
    pub rsi_14: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
}

/// The most recent row of the indicator table
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi_14: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

impl IndicatorSeries {
    /// Compute all indicator columns from a close series, oldest first
    pub fn from_closes(closes: &[f64]) -> Self {
        let sma_50 = sma(closes, SMA_SHORT_WINDOW);
        let sma_200 = sma(closes, SMA_LONG_WINDOW);
        let rsi_14 = rsi(closes, RSI_WINDOW);

        let bb_middle = sma(closes, BOLLINGER_WINDOW);
        let std = rolling_std(closes, BOLLINGER_WINDOW);
        let bb_upper = band(&bb_middle, &std, BOLLINGER_WIDTH);
        let bb_lower = band(&bb_middle, &std, -BOLLINGER_WIDTH);

        Self {
            closes: closes.to_vec(),
            sma_50,
            sma_200,
            rsi_14,
            bb_middle,
            bb_upper,
            bb_lower,
        }
    }

    /// The latest row, or `None` for an empty series
    pub fn latest(&self) -> Option<IndicatorSnapshot> {
        let i = self.closes.len().checked_sub(1)?;
        Some(IndicatorSnapshot {
            close: self.closes[i],
            sma_50: self.sma_50[i],
            sma_200: self.sma_200[i],
            rsi_14: self.rsi_14[i],
            bb_middle: self.bb_middle[i],
            bb_upper: self.bb_upper[i],
            bb_lower: self.bb_lower[i],
        })
    }
}

/// Trailing simple moving average; `None` until `window` values exist
fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Trailing sample standard deviation (ddof 1) over `window` values
fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                let mean = slice.iter().sum::<f64>() / window as f64;
                let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (window - 1) as f64;
                Some(variance.sqrt())
            }
        })
        .collect()
}

fn band(middle: &[Option<f64>], std: &[Option<f64>], width: f64) -> Vec<Option<f64>> {
    middle
        .iter()
        .zip(std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m + width * s),
            _ => None,
        })
        .collect()
}

/// Relative strength index over rolling-mean gains and losses
///
/// The first value appears once `window` day-over-day changes exist,
/// i.e. at index `window`. A window whose average loss is zero reads
/// exactly 100.
fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut gains = vec![0.0; closes.len()];
    let mut losses = vec![0.0; closes.len()];
    for i in 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        if delta >= 0.0 {
            gains[i] = delta;
        } else {
            losses[i] = -delta;
        }
    }

    closes
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i < window {
                return None;
            }
            let avg_gain = gains[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
            let avg_loss = losses[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
            if avg_loss == 0.0 {
                Some(100.0)
            } else {
                let rs = avg_gain / avg_loss;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_series(value: f64, len: usize) -> Vec<f64> {
        vec![value; len]
    }

    #[test]
    fn test_sma_warmup_and_value() {
        let closes: Vec<f64> = (1..=6).map(f64::from).collect();
        let result = sma(&closes, 3);

        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[5], Some(5.0));
    }

    #[test]
    fn test_rsi_monotonic_rise_is_100() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let result = rsi(&closes, RSI_WINDOW);

        assert_eq!(result[RSI_WINDOW - 1], None);
        for value in &result[RSI_WINDOW..] {
            assert_eq!(*value, Some(100.0));
        }
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        let closes = constant_series(50.0, 30);
        let result = rsi(&closes, RSI_WINDOW);
        assert_eq!(result[RSI_WINDOW], Some(100.0));
    }

    #[test]
    fn test_rsi_monotonic_fall_is_0() {
        let closes: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        let result = rsi(&closes, RSI_WINDOW);
        assert_eq!(result[RSI_WINDOW], Some(0.0));
    }

    #[test]
    fn test_rsi_alternating_equal_moves_is_50() {
        // Gains and losses of identical size average out to RS = 1
        let mut closes = vec![100.0];
        for i in 0..30 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let result = rsi(&closes, RSI_WINDOW);
        let value = result[20].unwrap();
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_flat_series_collapses_to_close() {
        let closes = constant_series(42.0, 25);
        let series = IndicatorSeries::from_closes(&closes);
        let latest = series.latest().unwrap();

        assert_eq!(latest.bb_middle, Some(42.0));
        assert_eq!(latest.bb_upper, Some(42.0));
        assert_eq!(latest.bb_lower, Some(42.0));
    }

    #[test]
    fn test_bollinger_uses_sample_deviation() {
        // Closes 1..=20: mean 10.5, sample variance 665/19 = 35
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let series = IndicatorSeries::from_closes(&closes);
        let latest = series.latest().unwrap();

        let expected_std = 35.0_f64.sqrt();
        assert!((latest.bb_upper.unwrap() - (10.5 + 2.0 * expected_std)).abs() < 1e-9);
        assert!((latest.bb_lower.unwrap() - (10.5 - 2.0 * expected_std)).abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_bands_bracket_the_mean() {
        let closes: Vec<f64> = (1..=40).map(|i| 100.0 + f64::from(i % 5)).collect();
        let series = IndicatorSeries::from_closes(&closes);
        let latest = series.latest().unwrap();

        let middle = latest.bb_middle.unwrap();
        assert!(latest.bb_upper.unwrap() > middle);
        assert!(latest.bb_lower.unwrap() < middle);

        // Symmetric around the middle band
        let up = latest.bb_upper.unwrap() - middle;
        let down = middle - latest.bb_lower.unwrap();
        assert!((up - down).abs() < 1e-9);
    }

    #[test]
    fn test_warmup_counts() {
        let closes: Vec<f64> = (1..=250).map(f64::from).collect();
        let series = IndicatorSeries::from_closes(&closes);

        assert_eq!(series.sma_50.iter().filter(|v| v.is_none()).count(), 49);
        assert_eq!(series.sma_200.iter().filter(|v| v.is_none()).count(), 199);
        assert_eq!(series.rsi_14.iter().filter(|v| v.is_none()).count(), 14);
        assert_eq!(series.bb_middle.iter().filter(|v| v.is_none()).count(), 19);
    }

    #[test]
    fn test_no_future_leakage() {
        // Appending data must not change earlier rows
        let closes: Vec<f64> = (1..=60).map(|i| 100.0 + f64::from(i % 7)).collect();
        let full = IndicatorSeries::from_closes(&closes);
        let truncated = IndicatorSeries::from_closes(&closes[..55]);

        assert_eq!(full.sma_50[54], truncated.sma_50[54]);
        assert_eq!(full.rsi_14[54], truncated.rsi_14[54]);
        assert_eq!(full.bb_upper[54], truncated.bb_upper[54]);
    }

    #[test]
    fn test_short_series_is_all_none() {
        let closes = constant_series(10.0, 5);
        let series = IndicatorSeries::from_closes(&closes);
        let latest = series.latest().unwrap();

        assert_eq!(latest.close, 10.0);
        assert_eq!(latest.sma_50, None);
        assert_eq!(latest.rsi_14, None);
        assert_eq!(latest.bb_middle, None);
    }

    #[test]
    fn test_empty_series() {
        let series = IndicatorSeries::from_closes(&[]);
        assert!(series.latest().is_none());
    }
}
