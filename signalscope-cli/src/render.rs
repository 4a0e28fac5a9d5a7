//! Terminal rendering for stage progress and the final report.

use signalscope_core::{Classification, RunState, SignalReport};

/// Print a one-line progress marker for the current run state.
pub fn print_progress(state: RunState) {
    let line = match state {
        RunState::Idle => return,
        RunState::Planning => "[1/3] Planning research...",
        RunState::Researching => "[2/3] Gathering evidence...",
        RunState::Analyzing => "[3/3] Extracting signals...",
        RunState::Completed => "Done.",
        RunState::Failed => "Run failed.",
    };
    eprintln!("{line}");
}

fn classification_label(c: Classification) -> &'static str {
    match c {
        Classification::StrongSignal => "STRONG SIGNAL",
        Classification::WeakSignal => "weak signal",
        Classification::Noise => "noise",
    }
}

/// Format the final report as readable terminal text.
pub fn render_report(report: &SignalReport) -> String {
    let mut out = String::new();

    out.push_str("\n=== Signal Report ===\n\n");
    out.push_str(&report.executive_summary);
    out.push_str("\n\n");

    if report.patterns.is_empty() {
        out.push_str("No problem patterns were found.\n");
    }

    for (i, pattern) in report.patterns.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} [{}]\n",
            i + 1,
            pattern.title,
            classification_label(pattern.classification)
        ));
        out.push_str(&format!("   {}\n", pattern.description));
        out.push_str(&format!(
            "   frequency {:.0}/5 | desperation {:.0}/5 | willingness-to-pay {:.0}/5 | trend {:.0}/5\n",
            pattern.scores.frequency,
            pattern.scores.desperation,
            pattern.scores.willingness_to_pay,
            pattern.scores.trend
        ));
        for quote in &pattern.quotes {
            out.push_str(&format!(
                "   \"{}\"\n     - {}, {} ({})\n",
                quote.text, quote.source, quote.date, quote.url
            ));
        }
        out.push('\n');
    }

    if !report.next_steps.is_empty() {
        out.push_str("Next steps:\n");
        for step in &report.next_steps {
            out.push_str(&format!("  - {step}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use signalscope_core::{PatternScores, ProblemPattern, Quote};

    fn sample_report() -> SignalReport {
        SignalReport {
            executive_summary: "Scheduling reliability dominates.".to_string(),
            patterns: vec![ProblemPattern {
                id: "p1".to_string(),
                title: "Lost bookings".to_string(),
                description: "Scheduling software drops bookings.".to_string(),
                scores: PatternScores {
                    frequency: 4.0,
                    desperation: 4.0,
                    willingness_to_pay: 3.0,
                    trend: 3.0,
                },
                classification: Classification::StrongSignal,
                quotes: vec![Quote {
                    text: "It keeps losing my bookings".to_string(),
                    source: "r/gymowners".to_string(),
                    date: "2026-03-01".to_string(),
                    url: "https://example.com".to_string(),
                }],
            }],
            next_steps: vec!["Interview five owners.".to_string()],
        }
    }

    #[test]
    fn test_classification_labels() {
        assert_eq!(
            classification_label(Classification::StrongSignal),
            "STRONG SIGNAL"
        );
        assert_eq!(classification_label(Classification::Noise), "noise");
    }

    #[test]
    fn test_render_report_includes_all_sections() {
        let text = render_report(&sample_report());
        assert!(text.contains("Scheduling reliability dominates."));
        assert!(text.contains("1. Lost bookings [STRONG SIGNAL]"));
        assert!(text.contains("willingness-to-pay 3/5"));
        assert!(text.contains("\"It keeps losing my bookings\""));
        assert!(text.contains("- Interview five owners."));
    }

    #[test]
    fn test_render_empty_patterns() {
        let mut report = sample_report();
        report.patterns.clear();
        report.next_steps.clear();
        let text = render_report(&report);
        assert!(text.contains("No problem patterns were found."));
        assert!(!text.contains("Next steps:"));
    }
}
