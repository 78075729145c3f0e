//! Market data clients for equity-memo
//!
//! Two external providers feed the memo pipeline:
//!
//! - Yahoo Finance (no API key): daily price history and
//!   the `^TNX` 10-year Treasury yield used as the risk-free rate proxy
//! - Alpha Vantage (free API key): the fundamentals snapshot and the
//!   three annual financial statement series
//!
//! Every numeric field that the provider may omit is an `Option<f64>` in
//! the data model. The upstream convention of reporting 0 for a missing
//! field stops at this crate's boundary; downstream code decides per use
//! whether a missing value defaults, falls back, or fails.

pub mod alpha_vantage;
pub mod error;
pub mod types;
pub mod yahoo;

// Re-export main types
pub use alpha_vantage::AlphaVantageClient;
pub use error::{DataError, Result};
pub use types::{
    BalanceSheetRow, CashFlowRow, FinancialStatements, FundamentalsSnapshot, IncomeStatementRow,
    Quote,
};
pub use yahoo::YahooFinanceClient;
