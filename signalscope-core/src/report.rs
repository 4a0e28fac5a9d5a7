//! Typed artifacts produced by the research pipeline.
//!
//! All three artifacts are values owned by the pipeline invocation that
//! produced them: no back-references, immutable once returned. Wire names
//! are camelCase to match the field names the schema contracts declare.

use serde::{Deserialize, Serialize};

/// Output of stage 1: where to look and what to search for.
///
/// All five fields are required by the schema; empty vectors are valid,
/// absence is not. Duplicate entries are wasteful but not invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPlan {
    pub subreddits: Vec<SubredditTarget>,
    pub software_categories: Vec<String>,
    pub competitor_apps: Vec<String>,
    pub search_strings: Vec<String>,
    pub niche_forums: Vec<String>,
}

/// A community to mine, with the queries to run against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubredditTarget {
    pub name: String,
    pub queries: Vec<String>,
}

/// The final output of stage 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReport {
    pub executive_summary: String,
    pub patterns: Vec<ProblemPattern>,
    pub next_steps: Vec<String>,
}

/// One validated problem pattern with its scores and backing quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemPattern {
    /// Unique within a report.
    pub id: String,
    pub title: String,
    pub description: String,
    pub scores: PatternScores,
    pub classification: Classification,
    pub quotes: Vec<Quote>,
}

/// Scoring dimensions, each intended to lie in [1,5].
///
/// The range is a convention of the generation prompt; out-of-range values
/// are passed through unmodified (the pipeline logs a warning but trusts
/// the model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternScores {
    pub frequency: f64,
    pub desperation: f64,
    pub willingness_to_pay: f64,
    pub trend: f64,
}

impl PatternScores {
    /// Whether every dimension lies in the conventional [1,5] range.
    pub fn in_conventional_range(&self) -> bool {
        [
            self.frequency,
            self.desperation,
            self.willingness_to_pay,
            self.trend,
        ]
        .iter()
        .all(|s| (1.0..=5.0).contains(s))
    }
}

/// Whether a pattern represents genuine demand, weak demand, or noise.
///
/// A signal classification requires at least one quote with an implied or
/// explicit desired alternative - a rule enforced by the generation prompt,
/// not by a local validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Strong Signal")]
    StrongSignal,
    #[serde(rename = "Weak Signal")]
    WeakSignal,
    #[serde(rename = "Noise")]
    Noise,
}

impl Classification {
    /// True for `StrongSignal` and `WeakSignal`.
    pub fn is_signal(&self) -> bool {
        !matches!(self, Classification::Noise)
    }
}

/// A quoted complaint with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub source: String,
    pub date: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plan_round_trips_camel_case() {
        let json = serde_json::json!({
            "subreddits": [{"name": "r/gymowners", "queries": ["software frustrations"]}],
            "softwareCategories": ["Gym Management Software"],
            "competitorApps": [],
            "searchStrings": ["gym software complaints"],
            "nicheForums": []
        });
        let plan: ResearchPlan = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(plan.subreddits[0].name, "r/gymowners");
        assert_eq!(plan.software_categories, vec!["Gym Management Software"]);
        assert_eq!(serde_json::to_value(&plan).unwrap(), json);
    }

    #[test]
    fn test_plan_rejects_missing_field() {
        // nicheForums absent: absence is invalid even though emptiness is fine.
        let json = serde_json::json!({
            "subreddits": [],
            "softwareCategories": [],
            "competitorApps": [],
            "searchStrings": []
        });
        assert!(serde_json::from_value::<ResearchPlan>(json).is_err());
    }

    #[test]
    fn test_classification_wire_names() {
        assert_eq!(
            serde_json::to_value(Classification::StrongSignal).unwrap(),
            serde_json::json!("Strong Signal")
        );
        assert_eq!(
            serde_json::from_value::<Classification>(serde_json::json!("Weak Signal")).unwrap(),
            Classification::WeakSignal
        );
        assert!(Classification::WeakSignal.is_signal());
        assert!(!Classification::Noise.is_signal());
    }

    #[test]
    fn test_scores_conventional_range() {
        let ok = PatternScores {
            frequency: 4.0,
            desperation: 4.0,
            willingness_to_pay: 3.0,
            trend: 3.0,
        };
        assert!(ok.in_conventional_range());

        let out = PatternScores {
            frequency: 6.0,
            ..ok.clone()
        };
        assert!(!out.in_conventional_range());
    }
}
