use crate::cli::args::InsightsArgs;
use crate::exit_codes::EXIT_SUCCESS;
use shakeout_core::insights::{write_insights, InsightDocument, InsightGenerator};
use shakeout_core::report::{insights_path, read_document};

pub async fn run(args: InsightsArgs) -> anyhow::Result<i32> {
    // Unlike the run flow, a standalone analysis of an unreadable
    // results file has nothing to degrade to, so it aborts.
    let document = read_document(&args.results)?;

    let generator = InsightGenerator::new(args.api_key.clone(), args.model.clone(), args.mock);
    let insights = generator.analyze(&document, &args.results).await;

    let path = insights_path(&args.results);
    write_insights(&insights, &path)?;
    print_insights(&insights);
    eprintln!("\nInsights saved to: {}", path.display());

    Ok(EXIT_SUCCESS)
}

fn print_insights(insights: &InsightDocument) {
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("AI Insights");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if insights.insights.is_empty() {
        eprintln!("No insights generated.");
        return;
    }
    for insight in insights.insights.values() {
        eprintln!("\n- {} (in {})", insight.test_name, insight.module);
        eprintln!("  Root cause: {}...", truncate(&insight.root_cause, 60));
        eprintln!(
            "  Recommendation: {}...",
            truncate(&insight.recommendations, 60)
        );
    }
}

/// Char-based truncation. LLM text can hold multibyte characters, so
/// byte slicing is not safe here.
fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
