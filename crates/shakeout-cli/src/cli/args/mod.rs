use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shakeout",
    version,
    about = "Flaky-test detection: repeated isolated trials with per-test flakiness scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a suite repeatedly and score each test for flakiness
    Run(RunArgs),
    /// Generate AI insights for a saved results document
    Insights(InsightsArgs),
    Version,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Test suite path (file or directory) handed to the runner
    pub test_path: PathBuf,

    /// number of trials to attempt
    #[arg(short = 'i', long, env = "TEST_ITERATIONS", default_value_t = 5)]
    pub iterations: usize,

    /// explicit output file for the results document
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// directory for auto-named results files
    #[arg(long, env = "RESULTS_DIR", default_value = "results")]
    pub results_dir: PathBuf,

    /// concurrent trials (1 = strictly sequential)
    #[arg(short = 'p', long, env = "PARALLEL_EXECUTIONS", default_value_t = 1)]
    pub parallel: usize,

    /// per-trial timeout in seconds
    #[arg(long, env = "TRIAL_TIMEOUT", default_value_t = 300)]
    pub trial_timeout: u64,

    /// runner command prefix invoked for each trial
    #[arg(long, env = "SHAKEOUT_RUNNER", default_value = "python3 -m pytest")]
    pub runner: String,

    /// skip insight generation even when flaky tests are found
    #[arg(long)]
    pub no_insights: bool,

    /// use canned insight responses instead of a live provider
    #[arg(long)]
    pub mock_insights: bool,
}

#[derive(Parser, Clone)]
pub struct InsightsArgs {
    /// Results document produced by `shakeout run`
    pub results: PathBuf,

    /// OpenAI API key for live analysis
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// model used for analysis
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4")]
    pub model: String,

    /// use canned responses instead of calling the provider
    #[arg(long)]
    pub mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_with_defaults() {
        let cli = Cli::try_parse_from(["shakeout", "run", "tests/"])
            .expect("parse should succeed");

        match cli.cmd {
            Command::Run(args) => {
                assert_eq!(args.test_path, PathBuf::from("tests/"));
                assert_eq!(args.iterations, 5);
                assert_eq!(args.parallel, 1);
                assert_eq!(args.trial_timeout, 300);
                assert_eq!(args.runner, "python3 -m pytest");
                assert_eq!(args.results_dir, PathBuf::from("results"));
                assert!(args.output.is_none());
                assert!(!args.no_insights);
                assert!(!args.mock_insights);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn run_parses_explicit_values() {
        let cli = Cli::try_parse_from([
            "shakeout",
            "run",
            "suite/",
            "-i",
            "10",
            "-p",
            "4",
            "-o",
            "out.json",
            "--runner",
            "cargo test",
            "--mock-insights",
        ])
        .expect("parse should succeed");

        match cli.cmd {
            Command::Run(args) => {
                assert_eq!(args.iterations, 10);
                assert_eq!(args.parallel, 4);
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
                assert_eq!(args.runner, "cargo test");
                assert!(args.mock_insights);
            }
            _ => panic!("expected run subcommand"),
        }
    }

    #[test]
    fn insights_parses_with_defaults() {
        let cli = Cli::try_parse_from(["shakeout", "insights", "results/run.json"])
            .expect("parse should succeed");

        match cli.cmd {
            Command::Insights(args) => {
                assert_eq!(args.results, PathBuf::from("results/run.json"));
                assert_eq!(args.model, "gpt-4");
                assert!(!args.mock);
            }
            _ => panic!("expected insights subcommand"),
        }
    }

    #[test]
    fn run_requires_test_path() {
        assert!(Cli::try_parse_from(["shakeout", "run"]).is_err());
    }
}
