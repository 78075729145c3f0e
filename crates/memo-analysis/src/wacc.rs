//! Weighted average cost of capital
//!
//! Cost of equity comes from CAPM with a hardcoded long-run market
//! return assumption; cost of debt from the most recent interest expense
//! and an effective tax rate, with fixed fallbacks when the statements
//! don't support the calculation. The blend is weighted by market values
//! of equity and debt. This stage always produces a rate.

use memo_data::{FinancialStatements, FundamentalsSnapshot};
use serde::Serialize;
use tracing::warn;

/// Assumed long-term market return for the CAPM equity risk premium
pub const MARKET_RETURN: f64 = 0.08;

/// Beta used when the provider doesn't report one
pub const DEFAULT_BETA: f64 = 1.0;

/// Statutory-rate stand-in when the effective tax rate can't be derived
pub const DEFAULT_TAX_RATE: f64 = 0.21;

/// Assumed pre-tax cost of debt when statement data is unusable
pub const DEFAULT_PRETAX_COST_OF_DEBT: f64 = 0.04;

/// The components of the WACC calculation, kept for verification output
#[derive(Debug, Clone, Serialize)]
pub struct WaccInputs {
    pub risk_free_rate: f64,
    pub beta: f64,
    pub equity_risk_premium: f64,
    pub cost_of_equity: f64,
    /// After-tax cost of debt
    pub cost_of_debt: f64,
    pub wacc: f64,
}

/// Derive WACC from the snapshot, statement series, and risk-free rate
pub fn calculate_wacc(
    snapshot: &FundamentalsSnapshot,
    statements: &FinancialStatements,
    risk_free_rate: f64,
) -> WaccInputs {
    // Cost of equity (CAPM)
    let beta = snapshot.beta.unwrap_or(DEFAULT_BETA);
    let equity_risk_premium = MARKET_RETURN - risk_free_rate;
    let cost_of_equity = risk_free_rate + beta * equity_risk_premium;

    // Cost of debt, after tax
    let total_debt = snapshot.total_debt.unwrap_or(0.0);
    let cost_of_debt = match statements.latest_interest_expense() {
        Some(interest_expense) => {
            let pre_tax = if total_debt > 0.0 {
                interest_expense / total_debt
            } else {
                0.0
            };
            pre_tax * (1.0 - effective_tax_rate(statements))
        }
        None => {
            warn!("Could not calculate cost of debt from financials; using default values");
            DEFAULT_PRETAX_COST_OF_DEBT * (1.0 - DEFAULT_TAX_RATE)
        }
    };

    // Market-value weights; all equity when total value is unusable
    let market_cap = snapshot.market_cap.unwrap_or(0.0);
    let total_value = market_cap + total_debt;
    let weight_of_equity = if total_value > 0.0 {
        market_cap / total_value
    } else {
        1.0
    };
    let weight_of_debt = 1.0 - weight_of_equity;

    let wacc = weight_of_equity * cost_of_equity + weight_of_debt * cost_of_debt;

    WaccInputs {
        risk_free_rate,
        beta,
        equity_risk_premium,
        cost_of_equity,
        cost_of_debt,
        wacc,
    }
}

/// Effective tax rate from the latest reported period
///
/// Defaults to the statutory stand-in when pre-tax income is missing or
/// non-positive (a loss year makes the ratio meaningless).
fn effective_tax_rate(statements: &FinancialStatements) -> f64 {
    match (
        statements.latest_income_tax_expense(),
        statements.latest_income_before_tax(),
    ) {
        (Some(tax_expense), Some(income_before_tax)) if income_before_tax > 0.0 => {
            tax_expense / income_before_tax
        }
        _ => DEFAULT_TAX_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_data::IncomeStatementRow;

    fn snapshot(beta: Option<f64>, market_cap: Option<f64>, total_debt: Option<f64>) -> FundamentalsSnapshot {
        FundamentalsSnapshot {
            symbol: "TEST".to_string(),
            beta,
            market_cap,
            total_debt,
            ..Default::default()
        }
    }

    fn statements_with(
        interest: Option<f64>,
        pre_tax_income: Option<f64>,
        tax_expense: Option<f64>,
    ) -> FinancialStatements {
        FinancialStatements {
            income: vec![IncomeStatementRow {
                fiscal_date: "2024-12-31".to_string(),
                total_revenue: None,
                net_income: None,
                income_before_tax: pre_tax_income,
                income_tax_expense: tax_expense,
                interest_expense: interest,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_cost_of_equity_capm() {
        let inputs = calculate_wacc(
            &snapshot(Some(1.2), Some(1000.0), Some(0.0)),
            &statements_with(Some(0.0), Some(100.0), Some(21.0)),
            0.03,
        );

        // 0.03 + 1.2 * (0.08 - 0.03)
        assert!((inputs.cost_of_equity - 0.09).abs() < 1e-12);
        assert!((inputs.equity_risk_premium - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_beta_defaults_to_one() {
        let inputs = calculate_wacc(
            &snapshot(None, Some(1000.0), None),
            &FinancialStatements::default(),
            0.03,
        );
        assert_eq!(inputs.beta, 1.0);
        assert!((inputs.cost_of_equity - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_no_debt_means_all_equity_weighting() {
        let inputs = calculate_wacc(
            &snapshot(Some(1.0), Some(1_000_000.0), Some(0.0)),
            &statements_with(Some(50.0), Some(100.0), Some(21.0)),
            0.03,
        );

        // With zero debt the blend must equal the cost of equity exactly
        assert_eq!(inputs.wacc, inputs.cost_of_equity);
        // And zero total debt makes the pre-tax cost of debt 0
        assert_eq!(inputs.cost_of_debt, 0.0);
    }

    #[test]
    fn test_missing_market_values_default_to_all_equity() {
        let inputs = calculate_wacc(
            &snapshot(Some(1.0), None, None),
            &FinancialStatements::default(),
            0.03,
        );
        assert_eq!(inputs.wacc, inputs.cost_of_equity);
    }

    #[test]
    fn test_cost_of_debt_from_statements() {
        let inputs = calculate_wacc(
            &snapshot(Some(1.0), Some(900.0), Some(100.0)),
            &statements_with(Some(5.0), Some(100.0), Some(20.0)),
            0.03,
        );

        // pre-tax 5/100 = 0.05, tax rate 0.20, after-tax 0.04
        assert!((inputs.cost_of_debt - 0.04).abs() < 1e-12);

        // weights 0.9 / 0.1
        let expected = 0.9 * inputs.cost_of_equity + 0.1 * 0.04;
        assert!((inputs.wacc - expected).abs() < 1e-12);
    }

    #[test]
    fn test_default_tax_rate_on_loss_year() {
        let inputs = calculate_wacc(
            &snapshot(Some(1.0), Some(900.0), Some(100.0)),
            &statements_with(Some(5.0), Some(-10.0), Some(2.0)),
            0.03,
        );

        let expected_cod = (5.0 / 100.0) * (1.0 - DEFAULT_TAX_RATE);
        assert!((inputs.cost_of_debt - expected_cod).abs() < 1e-12);
    }

    #[test]
    fn test_missing_statements_use_default_cost_of_debt() {
        let inputs = calculate_wacc(
            &snapshot(Some(1.0), Some(900.0), Some(100.0)),
            &FinancialStatements::default(),
            0.03,
        );

        let expected_cod = DEFAULT_PRETAX_COST_OF_DEBT * (1.0 - DEFAULT_TAX_RATE);
        assert!((inputs.cost_of_debt - expected_cod).abs() < 1e-12);
    }
}
