//! Key financial ratio mapping
//!
//! The ratio set is fixed and provider-supplied; nothing here derives new
//! numbers. A field the snapshot does not carry maps to 0.0, which the
//! memo reader should treat as "not reported" rather than a measured
//! zero. This function cannot fail.

use memo_data::FundamentalsSnapshot;
use serde::Serialize;

/// One named ratio with its plain-language description
#[derive(Debug, Clone, Serialize)]
pub struct RatioRecord {
    pub name: &'static str,
    pub value: f64,
    pub description: &'static str,
}

/// Map the fundamentals snapshot to the fixed suite of key ratios
pub fn key_ratios(snapshot: &FundamentalsSnapshot) -> Vec<RatioRecord> {
    let field = |value: Option<f64>| value.unwrap_or(0.0);

    vec![
        RatioRecord {
            name: "Profit Margin",
            value: field(snapshot.profit_margin),
            description: "Measures how much profit is generated for every dollar of revenue. Higher is better.",
        },
        RatioRecord {
            name: "Return on Equity (ROE)",
            value: field(snapshot.return_on_equity),
            description: "Measures how effectively the company uses shareholder money to generate profit. Consistently high ROE is a great sign.",
        },
        RatioRecord {
            name: "Current Ratio",
            value: field(snapshot.current_ratio),
            description: "Compares current assets to current liabilities. A ratio > 1 suggests good short-term financial health.",
        },
        RatioRecord {
            name: "Debt to Equity Ratio",
            value: field(snapshot.debt_to_equity),
            description: "Measures the company's debt relative to its shareholder equity. A high ratio can signal risk.",
        },
        RatioRecord {
            name: "Price-to-Earnings (P/E) Ratio",
            value: field(snapshot.trailing_pe),
            description: "Tells you how much investors are willing to pay for each dollar of earnings. Compare to industry average.",
        },
        RatioRecord {
            name: "Price-to-Book (P/B) Ratio",
            value: field(snapshot.price_to_book),
            description: "Compares the company's market price to its 'book value'. A low P/B can indicate a value stock.",
        },
        RatioRecord {
            name: "Price/Earnings-to-Growth (PEG) Ratio",
            value: field(snapshot.peg_ratio),
            description: "A P/E ratio adjusted for growth. A PEG around 1 is often considered fairly valued for a growth stock.",
        },
    ]
}
