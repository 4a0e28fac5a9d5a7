//! Prompt construction for the three pipeline stages.
//!
//! The scoring rubrics, quote counts, and classification rule live here as
//! prompt text; they are conventions the model is asked to follow, not
//! constraints the pipeline enforces mechanically.

use crate::report::ResearchPlan;

/// Stage 1: ask for a structured research plan.
pub fn planning_prompt(market: &str) -> String {
    format!(
        "You are a market research strategist. A founder wants to validate \
         software pain points in the following market:\n\n\"{market}\"\n\n\
         Produce a research plan for discovering real, recurring complaints \
         from people in this market. Include:\n\
         - subreddits: communities where these people gather, each with 2-4 \
           concrete search queries to run against it\n\
         - softwareCategories: review-platform categories to mine (for \
           example \"CRM software\")\n\
         - competitorApps: specific products whose negative reviews are \
           worth reading\n\
         - searchStrings: generic web search queries\n\
         - nicheForums: industry forums or communities outside Reddit\n\n\
         Favor places where practitioners complain candidly over marketing \
         channels."
    )
}

/// Stage 2: ask for open-ended evidence gathering, grounded in the plan.
///
/// The plan is embedded verbatim as pretty-printed JSON so the model can
/// ground its searches in the planned communities and queries. Infallible:
/// the plan came from our own serde types.
pub fn research_prompt(market: &str, plan: &ResearchPlan) -> String {
    let plan_json =
        serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are a market researcher investigating the market \"{market}\". \
         Execute the following research plan using web search:\n\n\
         {plan_json}\n\n\
         Search the planned subreddits, review categories, competitor \
         reviews, and forums. Collect direct quotes of complaints from real \
         people in this market. For every complaint capture:\n\
         - the quote text, verbatim\n\
         - the source (site or community name)\n\
         - the date, as precisely as available\n\
         - the URL\n\
         Flag desperation language: phrases like \"I'd pay anything\", \
         \"this is killing my business\", \"I've tried everything\". Note \
         when a complaint mentions a desired alternative, explicitly or by \
         implication. Report everything you find as prose with the quotes \
         inline; do not summarize away the raw evidence."
    )
}

/// Stage 3: ask for signal extraction and classification over the findings.
///
/// `findings` may be the no-data sentinel; the model is still asked to
/// analyze it, which by convention yields an empty or near-empty pattern
/// list rather than fabricated evidence.
pub fn analysis_prompt(market: &str, findings: &str) -> String {
    format!(
        "You are a market analyst. Below are raw research findings about \
         the market \"{market}\":\n\n{findings}\n\n\
         Extract recurring problem patterns and produce a signal report. \
         For each pattern:\n\
         - give it a short stable id, a title, and a description\n\
         - score each dimension from 1 to 5:\n\
           * frequency: 1 = mentioned once, 5 = comes up constantly\n\
           * desperation: 1 = mild annoyance, 5 = acute desperation language\n\
           * willingnessToPay: 1 = no spending intent, 5 = explicit offers to pay\n\
           * trend: 1 = fading, 5 = rapidly growing\n\
         - classify it: \"Strong Signal\" or \"Weak Signal\" ONLY if at \
           least one quote contains an implied or explicit desired \
           alternative; otherwise \"Noise\"\n\
         - back it with 3-5 quotes, each with text, source, date, and url, \
           taken from the findings above - never invent quotes\n\
         Also write an executive summary and recommended next research \
         steps. If the findings contain no usable evidence, return an empty \
         patterns list and say so in the summary."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SubredditTarget;

    fn plan() -> ResearchPlan {
        ResearchPlan {
            subreddits: vec![SubredditTarget {
                name: "r/gymowners".to_string(),
                queries: vec!["software frustrations".to_string()],
            }],
            software_categories: vec!["Gym Management Software".to_string()],
            competitor_apps: vec![],
            search_strings: vec![],
            niche_forums: vec![],
        }
    }

    #[test]
    fn test_planning_prompt_embeds_market() {
        let prompt = planning_prompt("gym owners");
        assert!(prompt.contains("\"gym owners\""));
        assert!(prompt.contains("subreddits"));
        assert!(prompt.contains("nicheForums"));
    }

    #[test]
    fn test_research_prompt_embeds_plan_verbatim() {
        let prompt = research_prompt("gym owners", &plan());
        // The serialized plan appears with its wire field names.
        assert!(prompt.contains("r/gymowners"));
        assert!(prompt.contains("\"softwareCategories\""));
        assert!(prompt.contains("desperation language"));
    }

    #[test]
    fn test_analysis_prompt_carries_rubric_and_rule() {
        let prompt = analysis_prompt("gym owners", "some findings");
        assert!(prompt.contains("some findings"));
        assert!(prompt.contains("from 1 to 5"));
        assert!(prompt.contains("desired"));
        assert!(prompt.contains("\"Noise\""));
    }
}
