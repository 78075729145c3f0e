//! Macroeconomic and industry commentary

use crate::error::Result;
use memo_llm::{ChatRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::{info, instrument};

/// Asks the model for macro, industry, and competitive context
pub struct ContextAnalyst {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ContextAnalyst {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Free-text commentary on the company's operating environment
    ///
    /// Sector and industry labels fall back to "N/A" upstream when the
    /// provider doesn't classify the company; the prompt passes them
    /// through as-is.
    #[instrument(skip(self), fields(model = %self.model))]
    pub async fn macro_and_industry(
        &self,
        symbol: &str,
        sector: &str,
        industry: &str,
    ) -> Result<String> {
        info!("Analyzing macroeconomic and industry context");

        let prompt = format!(
            "Act as a macroeconomic strategist. For a company like {symbol}, which is in \
             the '{sector}' sector and '{industry}' industry, analyze the following:\n\n\
             1.  **Current Macroeconomic Headwinds/Tailwinds:** Discuss the potential \
             impact of current inflation rates, interest rate policies by the Fed, and \
             overall GDP growth expectations on this company.\n\
             2.  **Industry-Specific Trends:** What are the 1-3 most significant trends \
             in the '{industry}' industry right now (e.g., AI adoption, supply chain \
             issues, regulatory changes)?\n\
             3.  **Competitive Landscape:** Who are the top 2-3 direct competitors? \
             Briefly state their main competitive advantage against {symbol}.\n\n\
             Provide a concise summary for each of the three points."
        );

        let request = ChatRequest::builder(&self.model)
            .add_message(Message::user(prompt))
            .build();

        let response = self.provider.complete(request).await?;
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memo_llm::{ChatResponse, TokenUsage};
    use std::sync::Mutex;

    struct RecordingProvider {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl LLMProvider for RecordingProvider {
        async fn complete(&self, request: ChatRequest) -> memo_llm::Result<ChatResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(ChatResponse {
                content: "macro context".to_string(),
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_prompt_names_symbol_sector_and_industry() {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
        });
        let analyst = ContextAnalyst::new(provider.clone(), "test-model");

        let text = analyst
            .macro_and_industry("NVDA", "Technology", "Semiconductors")
            .await
            .unwrap();
        assert_eq!(text, "macro context");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "test-model");
        let prompt = &seen[0].messages[0].content;
        assert!(prompt.contains("NVDA"));
        assert!(prompt.contains("'Technology' sector"));
        assert!(prompt.contains("'Semiconductors' industry"));
        assert!(prompt.contains("macroeconomic strategist"));
    }
}
