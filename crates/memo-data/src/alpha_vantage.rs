//! Alpha Vantage API client
//!
//! Source for the fundamentals snapshot (OVERVIEW + GLOBAL_QUOTE + latest
//! balance sheet) and the three annual statement series. The free tier
//! allows 5 requests per minute, enforced here with a direct rate limiter
//! so a full memo run never trips the server-side limit.
//!
//! Alpha Vantage reports every value as a string and uses `"None"` for
//! missing line items; parsing maps those to `None` instead of 0.

use crate::error::{DataError, Result};
use crate::types::{
    BalanceSheetRow, CashFlowRow, FinancialStatements, FundamentalsSnapshot, IncomeStatementRow,
};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

const BASE_URL: &str = "https://www.alphavantage.co/query";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Raw company overview payload (string-valued, as the API returns it)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "PriceToBookRatio")]
    pub price_to_book: Option<String>,
    #[serde(rename = "PEGRatio")]
    pub peg_ratio: Option<String>,
    pub beta: Option<String>,
    pub profit_margin: Option<String>,
    #[serde(rename = "ReturnOnEquityTTM")]
    pub return_on_equity: Option<String>,
    pub shares_outstanding: Option<String>,
}

/// Parse a string-valued numeric field, treating the API's missing-value
/// sentinels as absent
fn parse_field(value: Option<&str>) -> Option<f64> {
    value
        .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
        .and_then(|v| v.parse().ok())
}

/// Read a numeric field out of an annual report object
fn report_field(report: &Value, key: &str) -> Option<f64> {
    parse_field(report.get(key).and_then(Value::as_str))
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (default: 5 for free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            DataError::ConfigError(
                "ALPHA_VANTAGE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Ok(Self::new(api_key, 5)) // Default to free tier limit
    }

    /// Issue one API call and surface provider-level error payloads
    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let mut params = HashMap::new();
        params.insert("function", function);
        params.insert("symbol", symbol);
        params.insert("apikey", &self.api_key);

        debug!("Alpha Vantage request: {} {}", function, symbol);
        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(DataError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;

        // Check for API error messages
        if let Some(error) = data.get("Error Message") {
            return Err(DataError::AlphaVantageError(error.to_string()));
        }

        if data.get("Note").is_some() {
            return Err(DataError::RateLimitExceeded {
                provider: "Alpha Vantage".to_string(),
            });
        }

        Ok(data)
    }

    /// Get company overview and fundamental data
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let data = self.query("OVERVIEW", symbol).await?;

        // Check if data is empty (symbol not found)
        if data.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            return Err(DataError::InvalidSymbol(symbol.to_string()));
        }

        let overview: CompanyOverview = serde_json::from_value(data)?;
        Ok(overview)
    }

    /// Get the latest trade price
    pub async fn get_price(&self, symbol: &str) -> Result<Option<f64>> {
        let data = self.query("GLOBAL_QUOTE", symbol).await?;

        Ok(data
            .get("Global Quote")
            .and_then(|quote| quote.get("05. price"))
            .and_then(Value::as_str)
            .and_then(|price| price.parse().ok()))
    }

    /// Get annual income statements, newest first
    pub async fn get_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatementRow>> {
        let data = self.query("INCOME_STATEMENT", symbol).await?;

        Ok(annual_reports(&data)
            .iter()
            .map(|report| IncomeStatementRow {
                fiscal_date: fiscal_date(report),
                total_revenue: report_field(report, "totalRevenue"),
                net_income: report_field(report, "netIncome"),
                income_before_tax: report_field(report, "incomeBeforeTax"),
                income_tax_expense: report_field(report, "incomeTaxExpense"),
                interest_expense: report_field(report, "interestExpense"),
            })
            .collect())
    }

    /// Get annual balance sheets, newest first
    pub async fn get_balance_sheets(&self, symbol: &str) -> Result<Vec<BalanceSheetRow>> {
        let data = self.query("BALANCE_SHEET", symbol).await?;

        Ok(annual_reports(&data)
            .iter()
            .map(|report| {
                // The combined figure is not always reported; fall back to
                // summing the short- and long-term components
                let total_debt = report_field(report, "shortLongTermDebtTotal").or_else(|| {
                    match (
                        report_field(report, "shortTermDebt"),
                        report_field(report, "longTermDebt"),
                    ) {
                        (None, None) => None,
                        (short, long) => Some(short.unwrap_or(0.0) + long.unwrap_or(0.0)),
                    }
                });

                BalanceSheetRow {
                    fiscal_date: fiscal_date(report),
                    total_debt,
                    cash_and_equivalents: report_field(
                        report,
                        "cashAndCashEquivalentsAtCarryingValue",
                    ),
                    total_current_assets: report_field(report, "totalCurrentAssets"),
                    total_current_liabilities: report_field(report, "totalCurrentLiabilities"),
                    shareholder_equity: report_field(report, "totalShareholderEquity"),
                }
            })
            .collect())
    }

    /// Get annual cash flow statements, newest first
    pub async fn get_cash_flows(&self, symbol: &str) -> Result<Vec<CashFlowRow>> {
        let data = self.query("CASH_FLOW", symbol).await?;

        Ok(annual_reports(&data)
            .iter()
            .map(|report| {
                let operating = report_field(report, "operatingCashflow");
                let capex = report_field(report, "capitalExpenditures");
                let free_cash_flow = match (operating, capex) {
                    (Some(op), Some(cx)) => Some(op - cx),
                    _ => None,
                };

                CashFlowRow {
                    fiscal_date: fiscal_date(report),
                    operating_cashflow: operating,
                    capital_expenditure: capex,
                    free_cash_flow,
                }
            })
            .collect())
    }

    /// Fetch all three annual statement series for a symbol
    pub async fn fetch_statements(&self, symbol: &str) -> Result<FinancialStatements> {
        let income = self.get_income_statements(symbol).await?;
        let balance = self.get_balance_sheets(symbol).await?;
        let cash_flow = self.get_cash_flows(symbol).await?;

        Ok(FinancialStatements {
            income,
            balance,
            cash_flow,
        })
    }

    /// Assemble the fundamentals snapshot for a symbol
    ///
    /// Combines the company overview with the latest trade price and the
    /// most recent balance sheet (for debt, cash, and the liquidity ratios
    /// the overview endpoint does not carry).
    pub async fn fetch_snapshot(
        &self,
        symbol: &str,
        statements: &FinancialStatements,
    ) -> Result<FundamentalsSnapshot> {
        let overview = self.get_company_overview(symbol).await?;
        let price = self.get_price(symbol).await?;

        let latest_balance = statements.balance.first();
        let total_debt = latest_balance.and_then(|row| row.total_debt);
        let total_cash = latest_balance.and_then(|row| row.cash_and_equivalents);

        let current_ratio = latest_balance.and_then(|row| {
            match (row.total_current_assets, row.total_current_liabilities) {
                (Some(assets), Some(liabilities)) if liabilities > 0.0 => {
                    Some(assets / liabilities)
                }
                _ => None,
            }
        });

        let debt_to_equity = latest_balance.and_then(|row| {
            match (total_debt, row.shareholder_equity) {
                (Some(debt), Some(equity)) if equity > 0.0 => Some(debt / equity),
                _ => None,
            }
        });

        Ok(FundamentalsSnapshot {
            symbol: overview.symbol,
            name: overview.name,
            sector: overview.sector,
            industry: overview.industry,
            profit_margin: parse_field(overview.profit_margin.as_deref()),
            return_on_equity: parse_field(overview.return_on_equity.as_deref()),
            current_ratio,
            debt_to_equity,
            trailing_pe: parse_field(overview.pe_ratio.as_deref()),
            price_to_book: parse_field(overview.price_to_book.as_deref()),
            peg_ratio: parse_field(overview.peg_ratio.as_deref()),
            beta: parse_field(overview.beta.as_deref()),
            market_cap: parse_field(overview.market_cap.as_deref()),
            shares_outstanding: parse_field(overview.shares_outstanding.as_deref()),
            total_debt,
            total_cash,
            price,
        })
    }
}

fn annual_reports(data: &Value) -> Vec<Value> {
    data.get("annualReports")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn fiscal_date(report: &Value) -> String {
    report
        .get("fiscalDateEnding")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
