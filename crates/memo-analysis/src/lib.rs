//! Valuation and indicator calculations for equity-memo
//!
//! The calculation layer between raw provider data and the memo text:
//!
//! - Key ratio mapping from the fundamentals snapshot
//! - Five-year growth estimation (LLM reply parsing with a historical
//!   free-cash-flow fallback)
//! - WACC via CAPM plus after-tax cost of debt
//! - Multi-stage DCF with an explicit guard on the terminal value
//! - Trailing-window technical indicators (SMA, RSI, Bollinger Bands)
//!
//! Everything except the growth estimator is pure arithmetic over data
//! already fetched; the functions here never perform I/O themselves.

pub mod dcf;
pub mod growth;
pub mod ratios;
pub mod technical;
pub mod wacc;

// Re-export main types
pub use dcf::{DcfEngine, DcfInputs, DcfValuation, ValuationError};
pub use growth::GrowthEstimator;
pub use ratios::{RatioRecord, key_ratios};
pub use technical::{IndicatorSeries, IndicatorSnapshot};
pub use wacc::{WaccInputs, calculate_wacc};
