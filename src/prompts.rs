//! Prompt builders for the completion API.
//!
//! Each builder returns a [`Prompt`] whose schema hint describes, informally,
//! the JSON object the decoder in [`crate::decode`] expects back.

use crate::completion::Prompt;
use crate::models::{MarketGap, MvpProposal, OpportunityRecord};

const ANALYSIS_SCHEMA: &str = r#"{
  "marketGaps": [{
    "id": string, "title": string, "description": string,
    "gapSize": 1-10, "urgency": 1-10, "difficulty": 1-10,
    "industry": string, "estimatedMarketSize": string, "keyInsights": [string]
  }],
  "heatmapData": [{
    "industry": string, "opportunity": string, "intensity": 0-100,
    "revenue": number (millions), "competition": 0-100
  }],
  "competitiveAnalysis": {
    "oversaturatedAreas": [string], "underservedAreas": [string],
    "emergingTrends": [string], "riskFactors": [string]
  },
  "totalMarketSize": string
}"#;

const SUGGESTIONS_SCHEMA: &str = r#"{ "suggestions": [string] }"#;

const MVP_SCHEMA: &str = r#"{
  "title": string, "summary": string, "targetUsers": [string],
  "coreFeatures": [{ "name": string, "description": string, "priority": "High" | "Medium" | "Low" }],
  "techStack": [string], "timeline": string, "estimatedBudget": string,
  "successMetrics": [string], "risks": [string]
}"#;

const ROADMAP_SCHEMA: &str = r#"{
  "title": string,
  "phases": [{ "name": string, "duration": string, "goals": [string], "deliverables": [string] }],
  "milestones": [string]
}"#;

fn describe_record(record: &OpportunityRecord) -> String {
    format!(
        "- {} ({}; market size {}; competition {}): {} Pain points: {}",
        record.title,
        record.industry,
        record.market_size,
        record.competition_level.as_str(),
        record.description,
        record.pain_points.join("; ")
    )
}

/// Prompt classifying a query against the relevant catalog records.
pub fn analysis_prompt(query: &str, relevant: &[&OpportunityRecord]) -> Prompt {
    let context = if relevant.is_empty() {
        "No catalog opportunities matched this query.".to_string()
    } else {
        let lines: Vec<String> = relevant.iter().map(|r| describe_record(r)).collect();
        format!("Related catalog opportunities:\n{}", lines.join("\n"))
    };

    Prompt {
        text: format!(
            "Analyse the market for the business idea \"{}\".\n\n{}\n\n\
             Identify underserved market gaps, plot each opportunity by revenue and \
             competition, and summarise the competitive landscape.",
            query.trim(),
            context
        ),
        schema_hint: ANALYSIS_SCHEMA.to_string(),
    }
}

/// Prompt asking for completions of a partially typed query.
pub fn suggestions_prompt(partial: &str, limit: usize) -> Prompt {
    Prompt {
        text: format!(
            "Suggest up to {} short market-research search queries that start from \"{}\". \
             Each suggestion should name a specific industry or customer segment.",
            limit,
            partial.trim()
        ),
        schema_hint: SUGGESTIONS_SCHEMA.to_string(),
    }
}

/// Prompt asking for an MVP proposal that addresses one gap.
pub fn mvp_prompt(gap: &MarketGap) -> Prompt {
    Prompt {
        text: format!(
            "Propose a minimum viable product for this market gap.\n\
             Title: {}\nIndustry: {}\nDescription: {}\nEstimated market size: {}\n\
             Key insights: {}",
            gap.title,
            gap.industry,
            gap.description,
            gap.estimated_market_size,
            gap.key_insights.join("; ")
        ),
        schema_hint: MVP_SCHEMA.to_string(),
    }
}

/// Prompt asking for a phased roadmap for an MVP.
pub fn roadmap_prompt(mvp: &MvpProposal) -> Prompt {
    let features: Vec<String> = mvp
        .core_features
        .iter()
        .map(|f| format!("{} ({})", f.name, f.priority))
        .collect();
    Prompt {
        text: format!(
            "Create a product roadmap for \"{}\".\nSummary: {}\nCore features: {}\n\
             Timeline target: {}",
            mvp.title,
            mvp.summary,
            features.join(", "),
            mvp.timeline
        ),
        schema_hint: ROADMAP_SCHEMA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find;

    #[test]
    fn test_analysis_prompt_includes_records() {
        let record = find("clinic-no-show-prediction").unwrap();
        let prompt = analysis_prompt(" clinic scheduling ", &[record]);
        assert!(prompt.text.contains("\"clinic scheduling\""));
        assert!(prompt.text.contains("Patient No-Show Prediction"));
        assert!(prompt.schema_hint.contains("marketGaps"));
    }

    #[test]
    fn test_analysis_prompt_without_records() {
        let prompt = analysis_prompt("anything", &[]);
        assert!(prompt.text.contains("No catalog opportunities matched"));
    }

    #[test]
    fn test_suggestions_prompt_limit() {
        let prompt = suggestions_prompt("restau", 5);
        assert!(prompt.text.contains("up to 5"));
        assert!(prompt.schema_hint.contains("suggestions"));
    }
}
