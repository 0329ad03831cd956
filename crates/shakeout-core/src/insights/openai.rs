use super::client::InsightClient;
use async_trait::async_trait;
use serde_json::json;

pub struct OpenAIClient {
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            temperature: 0.2,
            max_tokens: 1500,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl InsightClient for OpenAIClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = "https://api.openai.com/v1/chat/completions";

        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": prompt
            }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let resp = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_else(|_| String::new());
            anyhow::bail!("OpenAI chat API error: {}", error_text);
        }

        let json: serde_json::Value = resp.json().await?;

        // Parse choices[0].message.content
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("OpenAI API response missing content"))?
            .to_string();

        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
