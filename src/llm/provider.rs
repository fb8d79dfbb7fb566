use crate::types::AppResult;
use async_trait::async_trait;

/// Default system context used when a caller does not supply one.
pub const DEFAULT_SYSTEM_ROLE: &str =
    "You are a pharmaceutical research AI assistant. Provide accurate, evidence-based insights.";

/// One text-completion round trip.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_role: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_role: DEFAULT_SYSTEM_ROLE.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    pub fn with_system_role(mut self, system_role: impl Into<String>) -> Self {
        self.system_role = system_role.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Seam between the aggregation pipeline and whichever completion API backs it.
#[async_trait]
pub trait CompletionAdapter: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;
}

/// Client wrapper around a completion adapter.
///
/// Fails closed: any transport or model error comes back as `"Error: <msg>"`
/// text. Callers can always treat the return value as present prose and must
/// never see an exception from this layer.
pub struct SummaryClient {
    adapter: Box<dyn CompletionAdapter>,
}

impl SummaryClient {
    pub fn groq(api_key: &str, model: &str) -> Self {
        Self {
            adapter: Box::new(crate::llm::groq::GroqAdapter::new(api_key, model)),
        }
    }

    /// Swap in a custom adapter (used by tests).
    pub fn with_adapter(adapter: Box<dyn CompletionAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn complete(&self, request: &CompletionRequest) -> String {
        match self.adapter.complete(request).await {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppError;

    struct FailingAdapter;

    #[async_trait]
    impl CompletionAdapter for FailingAdapter {
        async fn complete(&self, _request: &CompletionRequest) -> AppResult<String> {
            Err(AppError::LLMApi("connection refused".to_string()))
        }
    }

    struct EchoAdapter;

    #[async_trait]
    impl CompletionAdapter for EchoAdapter {
        async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
            Ok(format!("echo: {}", request.prompt))
        }
    }

    #[tokio::test]
    async fn errors_become_text_not_failures() {
        let client = SummaryClient::with_adapter(Box::new(FailingAdapter));
        let out = client.complete(&CompletionRequest::new("hi")).await;
        assert!(out.starts_with("Error: "));
        assert!(out.contains("connection refused"));
    }

    #[tokio::test]
    async fn successful_completion_passes_through() {
        let client = SummaryClient::with_adapter(Box::new(EchoAdapter));
        let out = client.complete(&CompletionRequest::new("hi")).await;
        assert_eq!(out, "echo: hi");
    }
}
