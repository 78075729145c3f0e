//! Data model shared by the market data clients
//!
//! All statement series are ordered newest fiscal period first, matching
//! the provider's report order; "latest" lookups scan from the front and
//! skip periods where the line item was not reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock quote data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

/// Point-in-time fundamentals for one company
///
/// Assembled once per run from the company overview, the latest global
/// quote, and the most recent balance sheet. `None` means the provider
/// did not report the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,

    pub profit_margin: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub peg_ratio: Option<f64>,

    pub beta: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,

    /// Latest market price per share
    pub price: Option<f64>,
}

/// One annual income statement period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatementRow {
    pub fiscal_date: String,
    pub total_revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub income_before_tax: Option<f64>,
    pub income_tax_expense: Option<f64>,
    pub interest_expense: Option<f64>,
}

/// One annual balance sheet period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetRow {
    pub fiscal_date: String,
    pub total_debt: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub total_current_assets: Option<f64>,
    pub total_current_liabilities: Option<f64>,
    pub shareholder_equity: Option<f64>,
}

/// One annual cash flow period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub fiscal_date: String,
    pub operating_cashflow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    /// Operating cash flow minus capital expenditure, when both reported
    pub free_cash_flow: Option<f64>,
}

/// Annual financial statement series, newest period first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub income: Vec<IncomeStatementRow>,
    pub balance: Vec<BalanceSheetRow>,
    pub cash_flow: Vec<CashFlowRow>,
}

impl FinancialStatements {
    /// Most recent reported interest expense
    pub fn latest_interest_expense(&self) -> Option<f64> {
        self.income.iter().find_map(|row| row.interest_expense)
    }

    /// Most recent reported pre-tax income
    pub fn latest_income_before_tax(&self) -> Option<f64> {
        self.income.iter().find_map(|row| row.income_before_tax)
    }

    /// Most recent reported income tax expense
    pub fn latest_income_tax_expense(&self) -> Option<f64> {
        self.income.iter().find_map(|row| row.income_tax_expense)
    }

    /// Most recent reported free cash flow
    pub fn latest_free_cash_flow(&self) -> Option<f64> {
        self.cash_flow.iter().find_map(|row| row.free_cash_flow)
    }

    /// Free cash flow history as (fiscal date, value) pairs, newest first
    pub fn fcf_history(&self) -> Vec<(String, f64)> {
        self.cash_flow
            .iter()
            .filter_map(|row| row.free_cash_flow.map(|fcf| (row.fiscal_date.clone(), fcf)))
            .collect()
    }
}
