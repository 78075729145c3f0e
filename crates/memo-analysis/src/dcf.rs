//! Discounted cash flow valuation
//!
//! Two-stage model: the latest free cash flow is projected five years at
//! the estimated growth rate and discounted at WACC, then a Gordon-growth
//! terminal value covers everything beyond. The perpetual growth rate is
//! the risk-free rate capped at 2.5%, since no business outgrows the
//! economy forever. A WACC at or below the perpetual rate makes the
//! terminal value blow up, so that case is refused outright instead of
//! reporting a nonsense fair value.
//!
//! The inputs that went into the model are always returned, even when the
//! valuation itself fails, so the memo can show its work either way.

use crate::growth::GrowthEstimator;
use crate::wacc::WaccInputs;
use memo_data::{FinancialStatements, FundamentalsSnapshot};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Number of explicitly projected years before the terminal value
pub const PROJECTION_YEARS: i32 = 5;

/// Upper bound on the perpetual growth rate
pub const PERPETUAL_GROWTH_CAP: f64 = 0.025;

/// Industry label used when the provider doesn't classify the company
const FALLBACK_INDUSTRY: &str = "general";

/// Reasons a DCF valuation cannot produce a fair value
#[derive(Debug, Clone, Error)]
pub enum ValuationError {
    #[error("no free cash flow reported in the statement history")]
    MissingFreeCashFlow,

    #[error("shares outstanding not reported; cannot compute per-share value")]
    MissingSharesOutstanding,

    #[error("no market price available; cannot compute upside")]
    MissingMarketPrice,

    #[error(
        "terminal value is degenerate: WACC {wacc:.4} does not exceed perpetual growth {perpetual_growth:.4}"
    )]
    DegenerateTerminalValue { wacc: f64, perpetual_growth: f64 },
}

/// Everything that went into the model, kept for verification output
#[derive(Debug, Clone, Serialize)]
pub struct DcfInputs {
    pub wacc: WaccInputs,
    /// Stage-1 annual growth rate, as a fraction
    pub five_year_growth_rate: f64,
    /// Gordon-growth rate beyond the projection window, as a fraction
    pub perpetual_growth_rate: f64,
    pub industry: String,
    /// (fiscal date, free cash flow) pairs, newest first
    pub fcf_history: Vec<(String, f64)>,
    pub shares_outstanding: Option<f64>,
    pub market_price: Option<f64>,
    /// Total debt minus cash, both treated as 0 when unreported
    pub net_debt: f64,
}

/// The successful outcome of a DCF run
#[derive(Debug, Clone, Serialize)]
pub struct DcfValuation {
    pub fair_value_per_share: f64,
    pub market_price: f64,
    /// Percentage gap between fair value and market price
    pub upside_pct: f64,
}

/// Present value of the five projected cash flows plus the terminal value
///
/// Year `k` cash flow is `last_fcf * (1 + growth)^k`, discounted by
/// `(1 + wacc)^k`. The terminal value grows the final projected flow one
/// more year at the perpetual rate and capitalizes it at
/// `wacc - perpetual_growth`, discounted back over the full window.
pub fn enterprise_value(
    last_fcf: f64,
    growth: f64,
    wacc: f64,
    perpetual_growth: f64,
) -> Result<f64, ValuationError> {
    if wacc <= perpetual_growth {
        return Err(ValuationError::DegenerateTerminalValue {
            wacc,
            perpetual_growth,
        });
    }

    let mut present_value = 0.0;
    let mut fcf = last_fcf;
    for year in 1..=PROJECTION_YEARS {
        fcf *= 1.0 + growth;
        present_value += fcf / (1.0 + wacc).powi(year);
    }

    let terminal = fcf * (1.0 + perpetual_growth) / (wacc - perpetual_growth);
    present_value += terminal / (1.0 + wacc).powi(PROJECTION_YEARS);

    Ok(present_value)
}

/// Fair value per share and upside from an assembled input set
pub fn valuate(inputs: &DcfInputs) -> Result<DcfValuation, ValuationError> {
    let last_fcf = inputs
        .fcf_history
        .first()
        .map(|(_, fcf)| *fcf)
        .ok_or(ValuationError::MissingFreeCashFlow)?;

    let shares = inputs
        .shares_outstanding
        .filter(|s| *s > 0.0)
        .ok_or(ValuationError::MissingSharesOutstanding)?;

    let market_price = inputs
        .market_price
        .filter(|p| *p > 0.0)
        .ok_or(ValuationError::MissingMarketPrice)?;

    let ev = enterprise_value(
        last_fcf,
        inputs.five_year_growth_rate,
        inputs.wacc.wacc,
        inputs.perpetual_growth_rate,
    )?;

    let equity_value = ev - inputs.net_debt;
    let fair_value_per_share = equity_value / shares;
    let upside_pct = (fair_value_per_share - market_price) / market_price * 100.0;

    debug!(
        ev,
        equity_value, fair_value_per_share, upside_pct, "DCF valuation complete"
    );

    Ok(DcfValuation {
        fair_value_per_share,
        market_price,
        upside_pct,
    })
}

/// Runs the full DCF pipeline for one company
pub struct DcfEngine {
    growth: GrowthEstimator,
}

impl DcfEngine {
    /// Create a new DCF engine around a growth estimator
    pub fn new(growth: GrowthEstimator) -> Self {
        Self { growth }
    }

    /// Assemble inputs and value the company
    ///
    /// The inputs are returned alongside the valuation result so callers
    /// can report the model's assumptions even when it refuses to value.
    #[instrument(skip_all, fields(symbol = %snapshot.symbol))]
    pub async fn value(
        &self,
        snapshot: &FundamentalsSnapshot,
        statements: &FinancialStatements,
        wacc: WaccInputs,
    ) -> (DcfInputs, Result<DcfValuation, ValuationError>) {
        let fcf_history = statements.fcf_history();
        let industry = snapshot
            .industry
            .clone()
            .unwrap_or_else(|| FALLBACK_INDUSTRY.to_string());

        let five_year_growth_rate = self
            .growth
            .industry_growth_rate(&industry, &fcf_history)
            .await;

        let perpetual_growth_rate = wacc.risk_free_rate.min(PERPETUAL_GROWTH_CAP);
        let net_debt =
            snapshot.total_debt.unwrap_or(0.0) - snapshot.total_cash.unwrap_or(0.0);

        let inputs = DcfInputs {
            wacc,
            five_year_growth_rate,
            perpetual_growth_rate,
            industry,
            fcf_history,
            shares_outstanding: snapshot.shares_outstanding,
            market_price: snapshot.price,
            net_debt,
        };

        let valuation = valuate(&inputs);
        (inputs, valuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wacc_inputs(wacc: f64, risk_free_rate: f64) -> WaccInputs {
        WaccInputs {
            risk_free_rate,
            beta: 1.0,
            equity_risk_premium: 0.08 - risk_free_rate,
            cost_of_equity: wacc,
            cost_of_debt: 0.0,
            wacc,
        }
    }

    fn inputs(
        last_fcf: f64,
        growth: f64,
        wacc: f64,
        perpetual_growth: f64,
        net_debt: f64,
        shares: f64,
        price: f64,
    ) -> DcfInputs {
        DcfInputs {
            wacc: wacc_inputs(wacc, perpetual_growth),
            five_year_growth_rate: growth,
            perpetual_growth_rate: perpetual_growth,
            industry: "Software".to_string(),
            fcf_history: vec![("2024-12-31".to_string(), last_fcf)],
            shares_outstanding: Some(shares),
            market_price: Some(price),
            net_debt,
        }
    }

    #[test]
    fn test_known_scenario() {
        // last_fcf=1000, g=10%, wacc=8%, gp=2%, net_debt=500, 100 shares
        let result = valuate(&inputs(1000.0, 0.10, 0.08, 0.02, 500.0, 100.0, 150.0)).unwrap();

        // Computed step by step as the model defines it
        let mut expected_ev = 0.0;
        let mut fcf = 1000.0;
        for year in 1..=5 {
            fcf *= 1.10;
            expected_ev += fcf / 1.08_f64.powi(year);
        }
        expected_ev += fcf * 1.02 / (0.08 - 0.02) / 1.08_f64.powi(5);
        let expected_fair = (expected_ev - 500.0) / 100.0;

        assert!((result.fair_value_per_share - expected_fair).abs() < 1e-9);
        assert!(result.fair_value_per_share > 230.0 && result.fair_value_per_share < 240.0);
        assert!(
            (result.upside_pct - (expected_fair - 150.0) / 150.0 * 100.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_degenerate_terminal_value_refused() {
        let err = valuate(&inputs(1000.0, 0.10, 0.02, 0.02, 0.0, 100.0, 150.0)).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::DegenerateTerminalValue { .. }
        ));

        // Strictly below is refused too
        let err = valuate(&inputs(1000.0, 0.10, 0.01, 0.02, 0.0, 100.0, 150.0)).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::DegenerateTerminalValue { .. }
        ));
    }

    #[test]
    fn test_missing_fcf_history() {
        let mut i = inputs(1000.0, 0.10, 0.08, 0.02, 0.0, 100.0, 150.0);
        i.fcf_history.clear();
        assert!(matches!(
            valuate(&i).unwrap_err(),
            ValuationError::MissingFreeCashFlow
        ));
    }

    #[test]
    fn test_missing_or_zero_shares() {
        let mut i = inputs(1000.0, 0.10, 0.08, 0.02, 0.0, 100.0, 150.0);
        i.shares_outstanding = None;
        assert!(matches!(
            valuate(&i).unwrap_err(),
            ValuationError::MissingSharesOutstanding
        ));

        i.shares_outstanding = Some(0.0);
        assert!(matches!(
            valuate(&i).unwrap_err(),
            ValuationError::MissingSharesOutstanding
        ));
    }

    #[test]
    fn test_missing_or_zero_market_price() {
        let mut i = inputs(1000.0, 0.10, 0.08, 0.02, 0.0, 100.0, 150.0);
        i.market_price = None;
        assert!(matches!(
            valuate(&i).unwrap_err(),
            ValuationError::MissingMarketPrice
        ));

        // A provider-reported 0 price means "not reported", not a free
        // stock; it must not produce an infinite upside
        i.market_price = Some(0.0);
        assert!(matches!(
            valuate(&i).unwrap_err(),
            ValuationError::MissingMarketPrice
        ));
    }

    #[test]
    fn test_negative_fcf_projects_through() {
        // A cash-burning company gets a negative fair value, not an error
        let result = valuate(&inputs(-1000.0, 0.10, 0.08, 0.02, 0.0, 100.0, 150.0)).unwrap();
        assert!(result.fair_value_per_share < 0.0);
        assert!(result.upside_pct < -100.0);
    }

    #[test]
    fn test_zero_growth_flat_projection() {
        let ev = enterprise_value(1000.0, 0.0, 0.10, 0.02).unwrap();

        let mut expected = 0.0;
        for year in 1..=5 {
            expected += 1000.0 / 1.10_f64.powi(year);
        }
        expected += 1000.0 * 1.02 / 0.08 / 1.10_f64.powi(5);

        assert!((ev - expected).abs() < 1e-9);
    }
}
