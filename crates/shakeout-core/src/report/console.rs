use crate::model::ResultDocument;

/// Format one flaky-test line for display. Deterministic, unit-testable.
#[must_use]
pub fn format_flaky_line(name: &str, score: f64, passes: usize, total: usize) -> String {
    format!(
        "⚠️  {:<28} score {:.2}  passed {}/{} runs",
        name, score, passes, total
    )
}

/// Print the run summary to stderr, keeping stdout clean for piping.
pub fn print_summary(document: &ResultDocument) {
    let s = &document.summary;

    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("Flaky Test Analysis");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("Tests analyzed:  {}", s.total_tests);
    eprintln!("Flaky:           {}", s.flaky_tests);
    eprintln!("Stable:          {}", s.stable_tests);
    eprintln!("Suite stability: {:.2}%", s.suite_stability_percentage);

    let flaky: Vec<_> = document.flaky_tests().collect();
    if flaky.is_empty() {
        eprintln!("\n✅ No flaky tests detected");
    } else {
        eprintln!("\nFlaky tests:");
        for record in flaky {
            let total = record.results.len();
            eprintln!(
                "{}",
                format_flaky_line(&record.name, record.flaky_score, record.passes, total)
            );
            eprintln!("    in {}", record.module);
        }
    }

    eprintln!("\nDetailed results saved to: {}", document.metadata.output_file);
}
