use crate::cli::args::RunArgs;
use crate::exit_codes::EXIT_SUCCESS;
use shakeout_core::engine::{Detector, RunPolicy};
use shakeout_core::insights::{write_insights, InsightGenerator};
use shakeout_core::report::{insights_path, print_summary};
use std::time::Duration;

/// Boolean env toggle. Only the literal "true" (any case) counts as
/// true; an unset variable falls back to the default.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(val) => val.to_lowercase() == "true",
        Err(_) => default,
    }
}

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let policy = RunPolicy {
        iterations: args.iterations,
        parallel: args.parallel,
        trial_timeout: Duration::from_secs(args.trial_timeout),
        runner: args
            .runner
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        ..RunPolicy::default()
    };

    let detector = Detector::new(&args.test_path, args.output.clone(), &args.results_dir, policy)?;
    let output_file = detector.output_file.clone();
    let document = detector.run().await?;

    print_summary(&document);

    let insights_enabled = !args.no_insights && env_flag("AI_ENABLED", true);
    if insights_enabled && document.summary.flaky_tests > 0 {
        let force_mock = args.mock_insights || env_flag("MOCK_AI_RESPONSES", false);
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string());

        let generator = InsightGenerator::new(api_key, model, force_mock);
        let insights = generator.analyze(&document, &output_file).await;
        let path = insights_path(&output_file);
        match write_insights(&insights, &path) {
            Ok(()) => eprintln!("AI insights saved to: {}", path.display()),
            Err(e) => tracing::error!(error = %e, "failed to save insights"),
        }
    }

    Ok(EXIT_SUCCESS)
}
