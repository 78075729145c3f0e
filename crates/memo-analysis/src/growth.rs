//! Five-year growth rate estimation
//!
//! The forward growth rate for the DCF projection comes from a language
//! model asked for an industry CAGR estimate. Model replies are free
//! text, so the number is pulled out with a pattern search rather than a
//! whole-string parse; when no number can be extracted (or the call
//! fails) the estimate falls back to historical free-cash-flow growth.
//! This stage never errors: callers always receive a usable fraction.

use memo_llm::{ChatRequest, LLMProvider, Message};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"[-+]?\d*\.\d+|[-+]?\d+").unwrap()
});

/// Extract a percentage from free text and convert it to a fraction
///
/// Takes the last numeric token in the reply, since models tend to lead
/// with stray words ("Around 12.5") even when asked for a bare number.
/// Returns `None` when the text contains no numeric token.
pub fn extract_percent(text: &str) -> Option<f64> {
    let token = NUMBER_RE.find_iter(text).last()?;
    let value: f64 = token.as_str().parse().ok()?;
    Some(value / 100.0)
}

/// Mean period-over-period percent change of a cash flow history
///
/// Input pairs are newest first (provider order); the changes are
/// computed in chronological order. Periods where the earlier value is
/// zero are skipped rather than producing an infinite change. Returns
/// `None` with fewer than two usable periods.
pub fn historical_growth_rate(fcf_history: &[(String, f64)]) -> Option<f64> {
    let mut changes = Vec::new();

    // Walk oldest to newest
    for pair in fcf_history.windows(2).rev() {
        let (newer, older) = (pair[0].1, pair[1].1);
        if older != 0.0 {
            changes.push(newer / older - 1.0);
        }
    }

    if changes.is_empty() {
        return None;
    }

    Some(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// Estimates the stage-1 growth rate for the DCF projection
pub struct GrowthEstimator {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl GrowthEstimator {
    /// Create a new growth estimator
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Five-year forward growth rate for an industry, as a fraction
    ///
    /// Asks the model for a single-number CAGR estimate; on any failure
    /// (call error or unparseable reply) logs a diagnostic and falls back
    /// to historical FCF growth, then to 0.
    pub async fn industry_growth_rate(
        &self,
        industry: &str,
        fcf_history: &[(String, f64)],
    ) -> f64 {
        let prompt = format!(
            "Act as a senior equity research analyst specializing in industry \
             forecasting. Based on current market trends, what is a reasonable \
             5-year forward Compound Annual Growth Rate (CAGR) estimate for the \
             '{industry}' industry?\n\n\
             Provide ONLY the numerical percentage in your response, without \
             the '%' sign. Your response should contain only one number. \
             For example: 15.5"
        );

        let request = ChatRequest::builder(&self.model)
            .add_message(Message::user(prompt))
            .max_tokens(64)
            .build();

        match self.provider.complete(request).await {
            Ok(response) => {
                if let Some(rate) = extract_percent(&response.content) {
                    info!(
                        "LLM estimated growth rate for '{}': {:.2}%",
                        industry,
                        rate * 100.0
                    );
                    return rate;
                }
                warn!(
                    "No numeric token in LLM growth reply ({:?}); falling back to historical FCF growth",
                    response.content
                );
            }
            Err(e) => {
                warn!("LLM growth estimate failed ({e}); falling back to historical FCF growth");
            }
        }

        match historical_growth_rate(fcf_history) {
            Some(rate) => rate,
            None => {
                warn!("No usable FCF history for growth fallback; assuming 0% growth");
                0.0
            }
        }
    }
}
