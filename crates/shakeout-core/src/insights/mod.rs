//! AI-assisted analysis of flaky tests.
//!
//! Insight generation is strictly additive: it reads a finished result
//! document and never alters detection output. Provider failures
//! degrade to the canned mock text so a bad network day cannot sink an
//! analysis run.

pub mod client;
pub mod openai;

pub use client::{InsightClient, MockInsightClient, MOCK_RESPONSE};
pub use openai::OpenAIClient;

use crate::model::{ResultDocument, TestRecord};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Analysis for one flaky test. The provider response is not parsed
/// into sections; each field carries the full text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestInsight {
    pub test_id: String,
    pub test_name: String,
    pub module: String,
    pub root_cause: String,
    pub recommendations: String,
    pub code_fix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsightMetadata {
    pub source_file: String,
    pub mock_responses: bool,
}

/// Companion document to a [`ResultDocument`], keyed the same way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsightDocument {
    pub metadata: InsightMetadata,
    pub insights: BTreeMap<String, TestInsight>,
}

pub struct InsightGenerator {
    client: Arc<dyn InsightClient>,
    mock: bool,
}

impl InsightGenerator {
    /// Select a provider. Live analysis needs a non-empty API key and
    /// no mock override; anything else gets the offline client.
    pub fn new(api_key: Option<String>, model: String, force_mock: bool) -> Self {
        match api_key.filter(|k| !k.is_empty()) {
            Some(key) if !force_mock => Self {
                client: Arc::new(OpenAIClient::new(model, key)),
                mock: false,
            },
            _ => Self {
                client: Arc::new(MockInsightClient),
                mock: true,
            },
        }
    }

    pub fn with_client(client: Arc<dyn InsightClient>, mock: bool) -> Self {
        Self { client, mock }
    }

    /// Analyze each flaky test in the document.
    ///
    /// A provider error on one test does not abort the rest: the entry
    /// falls back to [`MOCK_RESPONSE`] and the loop continues.
    pub async fn analyze(
        &self,
        document: &ResultDocument,
        source_file: &Path,
    ) -> InsightDocument {
        let mut insights = BTreeMap::new();

        for record in document.flaky_tests() {
            tracing::info!(
                test = %record.id,
                provider = self.client.provider_name(),
                "generating insight"
            );
            let prompt = build_prompt(record);
            let text = match self.client.complete(&prompt).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(
                        test = %record.id,
                        provider = self.client.provider_name(),
                        error = %e,
                        "insight request failed; using canned response"
                    );
                    MOCK_RESPONSE.to_string()
                }
            };

            insights.insert(
                record.id.clone(),
                TestInsight {
                    test_id: record.id.clone(),
                    test_name: record.name.clone(),
                    module: record.module.clone(),
                    root_cause: text.clone(),
                    recommendations: text.clone(),
                    code_fix: text,
                },
            );
        }

        InsightDocument {
            metadata: InsightMetadata {
                source_file: source_file.display().to_string(),
                mock_responses: self.mock,
            },
            insights,
        }
    }
}

/// Build the analysis prompt for one flaky test.
fn build_prompt(record: &TestRecord) -> String {
    let error_logs = if record.logs.is_empty() {
        "No error logs available.".to_string()
    } else {
        record
            .logs
            .iter()
            .map(|entry| entry.log.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are an expert in test automation. Analyze the following flaky test:\n\
         \n\
         Test ID: {id}\n\
         Test Name: {name}\n\
         Module: {module}\n\
         Flakiness Score: {score:.2}\n\
         Passes: {passes}\n\
         Failures: {failures}\n\
         \n\
         Error Logs:\n\
         {error_logs}\n\
         \n\
         Provide:\n\
         1. Root cause analysis\n\
         2. Likely reason for flakiness\n\
         3. Recommendations to fix the test\n\
         4. Suggested code fix (if possible)\n",
        id = record.id,
        name = record.name,
        module = record.module,
        score = record.flaky_score,
        passes = record.passes,
        failures = record.failures,
    )
}

/// Persist an insight document as pretty JSON next to its source.
pub fn write_insights(document: &InsightDocument, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
