//! Verification output
//!
//! Console tables that expose every number feeding the memo so a reader
//! can tally them against public sources (broker statistics pages, the
//! company's filings) before trusting the model's conclusions. Rendering
//! is separated from printing so the tables can be asserted on in tests.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use memo_analysis::{DcfInputs, IndicatorSnapshot, RatioRecord};
use std::fmt::Write as _;

fn header(title: &str) -> String {
    let bar = "=".repeat(60);
    format!("\n{bar}\n|    {:<54}|\n{bar}", title.to_uppercase())
}

/// Group an amount into thousands, e.g. `-1234567.0` -> `"-1,234,567"`
fn thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Render the fundamental ratio table with a verification hint
pub fn ratios_report(ratios: &[RatioRecord]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Ratio", "Value"]);
    for ratio in ratios {
        table.add_row(vec![ratio.name.to_string(), format!("{:.4}", ratio.value)]);
    }

    format!(
        "{}\n{table}\n\nACTION: Tally these ratios on Yahoo Finance (Statistics tab) \
         or Google Finance.",
        header("Verifiable Fundamental Ratios")
    )
}

/// Render the WACC components, growth assumptions, and cash flow inputs
pub fn dcf_inputs_report(inputs: &DcfInputs) -> String {
    let mut out = header("Verifiable DCF Model Inputs & WACC Calculation");

    let _ = write!(
        out,
        "\n\n--- Weighted Average Cost of Capital (WACC) Inputs ---\n\
         - Risk-Free Rate (U.S. 10-Yr Treasury): {:.4}%\n\
         - Company Beta (Volatility vs. Market): {:.4}\n\
         - Cost of Equity (Calculated using CAPM): {:.4}%\n\
         - WACC (Calculated Discount Rate): {:.4}%\n",
        inputs.wacc.risk_free_rate * 100.0,
        inputs.wacc.beta,
        inputs.wacc.cost_of_equity * 100.0,
        inputs.wacc.wacc * 100.0,
    );

    let _ = write!(
        out,
        "\n--- Multi-Stage Growth Rate Inputs ---\n\
         - Stage 1 Growth (Years 1-5): {:.2}%\n\
         \x20 (Source: LLM-based analysis of the '{}' industry)\n\
         - Stage 2 Growth (Perpetual): {:.4}%\n\
         \x20 (Source: Tied to U.S. 10-Year Treasury Yield for long-term stability)\n",
        inputs.five_year_growth_rate * 100.0,
        inputs.industry,
        inputs.perpetual_growth_rate * 100.0,
    );

    let mut fcf_table = Table::new();
    fcf_table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Fiscal Date", "Free Cash Flow"]);
    for (date, fcf) in &inputs.fcf_history {
        fcf_table.add_row(vec![date.clone(), thousands(*fcf)]);
    }

    let shares = inputs
        .shares_outstanding
        .map_or_else(|| "not reported".to_string(), thousands);

    let _ = write!(
        out,
        "\n--- Free Cash Flow & Other Data ---\n{fcf_table}\n\n\
         - Shares Outstanding: {shares}\n\
         - Net Debt (Total Debt - Cash): {}",
        thousands(inputs.net_debt),
    );

    out
}

/// Render the latest technical indicator readings
pub fn technical_report(snapshot: &IndicatorSnapshot) -> String {
    let cell = |value: Option<f64>| {
        value.map_or_else(|| "warming up".to_string(), |v| format!("{v:.2}"))
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Indicator", "Latest"]);
    table.add_row(vec!["Close".to_string(), format!("{:.2}", snapshot.close)]);
    table.add_row(vec!["SMA 50".to_string(), cell(snapshot.sma_50)]);
    table.add_row(vec!["SMA 200".to_string(), cell(snapshot.sma_200)]);
    table.add_row(vec!["RSI 14".to_string(), cell(snapshot.rsi_14)]);
    table.add_row(vec![
        "Bollinger Upper".to_string(),
        cell(snapshot.bb_upper),
    ]);
    table.add_row(vec![
        "Bollinger Middle".to_string(),
        cell(snapshot.bb_middle),
    ]);
    table.add_row(vec![
        "Bollinger Lower".to_string(),
        cell(snapshot.bb_lower),
    ]);

    format!("{}\n{table}", header("Latest Technical Indicators"))
}

/// Print the ratio table to the console
pub fn print_ratios(ratios: &[RatioRecord]) {
    println!("{}", ratios_report(ratios));
}

/// Print the DCF input breakdown to the console
pub fn print_dcf_inputs(inputs: &DcfInputs) {
    println!("{}", dcf_inputs_report(inputs));
}

/// Print the latest technical readings to the console
pub fn print_technical(snapshot: &IndicatorSnapshot) {
    println!("{}", technical_report(snapshot));
}
