//! Final investment memo synthesis
//!
//! Flattens every analysis stage into one large prompt and asks the
//! model to write the memo. Numeric inputs are pre-rendered into prose
//! here so the model never has to do arithmetic; a failed DCF run shows
//! up as an explicit "could not be completed" line rather than silently
//! dropping the valuation section.

use crate::error::Result;
use memo_analysis::dcf::ValuationError;
use memo_analysis::{DcfValuation, IndicatorSnapshot, RatioRecord};
use memo_llm::{ChatRequest, LLMProvider, Message};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything the memo prompt draws on
pub struct MemoContext<'a> {
    pub symbol: &'a str,
    pub ratios: &'a [RatioRecord],
    pub dcf: &'a std::result::Result<DcfValuation, ValuationError>,
    pub technical: Option<&'a IndicatorSnapshot>,
    pub commentary: &'a str,
}

/// Writes the final memo through the model
pub struct MemoGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl MemoGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Generate the investment memo text
    #[instrument(skip_all, fields(symbol = %context.symbol, model = %self.model))]
    pub async fn generate(&self, context: &MemoContext<'_>) -> Result<String> {
        info!("Generating final investment memo");

        let prompt = build_prompt(context);
        let request = ChatRequest::builder(&self.model)
            .add_message(Message::user(prompt))
            .max_tokens(4096)
            .build();

        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }
}

fn build_prompt(context: &MemoContext<'_>) -> String {
    let ratio_details = ratio_details(context.ratios);
    let dcf_summary = dcf_summary(context.dcf);
    let tech_summary = technical_summary(context.technical);
    let symbol = context.symbol;
    let commentary = context.commentary;

    format!(
        "**INVESTMENT MEMORANDUM**\n\n\
         **SUBJECT: Comprehensive Analysis of {symbol}**\n\n\
         **1. EXECUTIVE SUMMARY**\n\
         Act as a world-class portfolio manager. Synthesize all the following \
         information into a concise executive summary. State your final investment \
         thesis: Is this a Buy, Hold, or Sell at the current price? Justify your \
         reasoning with the most critical data points from the analysis.\n\n\
         **2. DEEP FUNDAMENTAL ANALYSIS**\n\
         * **Financial Ratios:**\n\
         {ratio_details}\n\
         * **Interpretation:** Based on these ratios, what is the overall picture of \
         the company's profitability, financial health, and current valuation?\n\n\
         **3. VALUATION ANALYSIS**\n\
         * **Discounted Cash Flow (DCF) Result:** {dcf_summary}\n\
         * **Interpretation:** How much weight should be given to this DCF result? \
         What are its key assumptions (like growth and discount rates)?\n\n\
         **4. TECHNICAL & QUANTITATIVE ANALYSIS**\n\
         * **Current Indicator State:** {tech_summary}\n\
         * **Interpretation:** What is the current market sentiment based on these \
         technical signals? Is it indicating a potential entry point or a time for \
         caution?\n\n\
         **5. MACROECONOMIC & INDUSTRY CONTEXT**\n\
         * **Analyst Summary:**\n\
         {commentary}\n\
         * **Interpretation:** How do the broader economic and industry factors \
         support or contradict a potential investment in {symbol}?\n\n\
         **6. FINAL SWOT ANALYSIS & RECOMMENDATION**\n\
         - **Strengths:** (Based on everything above)\n\
         - **Weaknesses:** (Based on everything above)\n\
         - **Opportunities:** (Based on everything above)\n\
         - **Threats:** (Based on everything above)\n\n\
         Conclude with your final, data-backed recommendation."
    )
}

fn ratio_details(ratios: &[RatioRecord]) -> String {
    if ratios.is_empty() {
        return "Fundamental ratio data was not available.".to_string();
    }

    let mut out = String::new();
    for ratio in ratios {
        let _ = writeln!(
            out,
            "    - **{}**: {:.2} ({})",
            ratio.name, ratio.value, ratio.description
        );
    }
    out.truncate(out.trim_end().len());
    out
}

fn dcf_summary(dcf: &std::result::Result<DcfValuation, ValuationError>) -> String {
    match dcf {
        Ok(valuation) => format!(
            "The DCF model estimates a fair value of ${:.2}, suggesting a potential \
             upside/downside of {:.2}% from the current price of ${:.2}.",
            valuation.fair_value_per_share, valuation.upside_pct, valuation.market_price
        ),
        Err(e) => format!(
            "The DCF valuation could not be completed: {e}. Treat the fair value \
             question as unanswered and weigh the other pillars accordingly."
        ),
    }
}

fn technical_summary(technical: Option<&IndicatorSnapshot>) -> String {
    match technical {
        Some(snapshot) => {
            let rsi = snapshot
                .rsi_14
                .map_or_else(|| "unavailable".to_string(), |v| format!("{v:.2}"));
            format!(
                "The current RSI is {rsi}. The price is trading relative to its \
                 50-day SMA and 200-day SMA."
            )
        }
        None => "Technical indicator data was not available.".to_string(),
    }
}
