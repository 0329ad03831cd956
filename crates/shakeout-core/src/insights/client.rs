use async_trait::async_trait;

/// Canned text used whenever no live provider response is available.
pub const MOCK_RESPONSE: &str =
    "Mock response: Unable to analyze the test due to insufficient data.";

/// Completion provider for insight generation.
#[async_trait]
pub trait InsightClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    fn provider_name(&self) -> &'static str;
}

/// Offline client. Always answers with [`MOCK_RESPONSE`].
pub struct MockInsightClient;

#[async_trait]
impl InsightClient for MockInsightClient {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(MOCK_RESPONSE.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
