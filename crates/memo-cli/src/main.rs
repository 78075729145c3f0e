//! Interactive investment memo generator
//!
//! Prompts for a ticker, runs the four analysis pillars in sequence
//! (fundamentals, valuation, technicals, macro context), prints
//! verification tables for every number feeding the model, then writes
//! the synthesized memo to `{TICKER}_investment_memo.txt`.
//!
//! # Usage
//!
//! ```bash
//! export ALPHA_VANTAGE_API_KEY="your-key"
//! # Ollama exposes an OpenAI-compatible API under /v1
//! export OPENAI_API_BASE="http://localhost:11434/v1"
//! export OPENAI_MODEL="llama3:8b-instruct-q4_0"
//!
//! cargo run --bin equity-memo
//! ```

use anyhow::Context;
use memo_analysis::{DcfEngine, GrowthEstimator, IndicatorSeries, calculate_wacc, key_ratios};
use memo_data::{AlphaVantageClient, YahooFinanceClient};
use memo_llm::LLMProvider;
use memo_llm::providers::{OpenAIConfig, OpenAIProvider};
use memo_report::verify::{print_dcf_inputs, print_ratios, print_technical};
use memo_report::{ContextAnalyst, MemoContext, MemoGenerator};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::warn;

/// Fallback when the Treasury yield lookup fails
const DEFAULT_RISK_FREE_RATE: f64 = 0.035;

fn prompt_for_symbol() -> anyhow::Result<String> {
    print!("Enter the stock ticker you want to analyze (e.g., AAPL, GOOGL): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let symbol = input.trim().to_uppercase();
    anyhow::ensure!(!symbol.is_empty(), "No ticker entered");
    anyhow::ensure!(
        symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '^'),
        "'{symbol}' does not look like a ticker symbol"
    );

    Ok(symbol)
}

fn llm_provider_config() -> (OpenAIConfig, String) {
    let api_base = env::var("OPENAI_API_BASE").unwrap_or_else(|_| {
        eprintln!("Warning: OPENAI_API_BASE not set, using local default");
        "http://localhost:11434/v1".to_string()
    });

    let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| {
        eprintln!("Warning: OPENAI_MODEL not set, using default");
        "llama3:8b-instruct-q4_0".to_string()
    });

    let config = OpenAIConfig::from_env()
        .with_api_base(api_base)
        .with_timeout(180);

    (config, model)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| {
            "warn,memo_data=info,memo_analysis=info,memo_report=info".to_string()
        }))
        .init();

    let symbol = prompt_for_symbol()?;

    let (openai_config, model) = llm_provider_config();
    let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::with_config(openai_config)?);

    let alpha_vantage = AlphaVantageClient::from_env()
        .context("Alpha Vantage configuration (set ALPHA_VANTAGE_API_KEY)")?;
    let yahoo = YahooFinanceClient::new();

    // Pillar 1: fundamentals
    println!("\nFetching financial statements for {symbol}...");
    let statements = alpha_vantage
        .fetch_statements(&symbol)
        .await
        .with_context(|| format!("Fetching financial statements for {symbol}"))?;
    let snapshot = alpha_vantage
        .fetch_snapshot(&symbol, &statements)
        .await
        .with_context(|| format!("Fetching fundamentals for {symbol}"))?;

    let ratios = key_ratios(&snapshot);
    print_ratios(&ratios);

    // Valuation
    let risk_free_rate = match yahoo.get_risk_free_rate().await {
        Ok(rate) => rate,
        Err(e) => {
            warn!(
                "Treasury yield lookup failed ({e}); using default risk-free rate of {:.2}%",
                DEFAULT_RISK_FREE_RATE * 100.0
            );
            DEFAULT_RISK_FREE_RATE
        }
    };

    let wacc = calculate_wacc(&snapshot, &statements, risk_free_rate);
    let engine = DcfEngine::new(GrowthEstimator::new(provider.clone(), model.clone()));
    let (dcf_inputs, dcf) = engine.value(&snapshot, &statements, wacc).await;
    print_dcf_inputs(&dcf_inputs);
    if let Err(e) = &dcf {
        eprintln!("\nNote: DCF valuation unavailable: {e}");
    }

    // Pillar 2: technicals
    println!("\nCalculating technical indicators...");
    let technical = match yahoo.get_historical_range(&symbol, "5y").await {
        Ok(quotes) => {
            let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
            IndicatorSeries::from_closes(&closes).latest()
        }
        Err(e) => {
            warn!("Price history lookup failed ({e}); memo will note missing technicals");
            None
        }
    };
    if let Some(latest) = &technical {
        print_technical(latest);
    }

    // Pillar 3: macro and industry context
    let sector = snapshot.sector.as_deref().unwrap_or("N/A");
    let industry = snapshot.industry.as_deref().unwrap_or("N/A");
    println!("\nAnalyzing macroeconomic and industry context with LLM...");
    let analyst = ContextAnalyst::new(provider.clone(), model.clone());
    let commentary = match analyst.macro_and_industry(&symbol, sector, industry).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Macro commentary failed ({e}); memo will note the gap");
            "Macroeconomic and industry commentary was not available for this run.".to_string()
        }
    };

    // Pillar 4: the memo itself
    println!("Generating final investment memo with LLM...");
    let generator = MemoGenerator::new(provider, model);
    let memo = generator
        .generate(&MemoContext {
            symbol: &symbol,
            ratios: &ratios,
            dcf: &dcf,
            technical: technical.as_ref(),
            commentary: &commentary,
        })
        .await
        .context("Memo generation")?;

    let bar = "=".repeat(50);
    println!("\n\n{bar}");
    println!("      COMPREHENSIVE INVESTMENT MEMO FOR {symbol}");
    println!("{bar}\n");
    println!("{memo}");

    let path = format!("{symbol}_investment_memo.txt");
    fs::write(&path, &memo).with_context(|| format!("Writing {path}"))?;
    println!("\nMemo saved to {path}");

    Ok(())
}
