//! Deterministic market-gap synthesis.
//!
//! Used whenever the completion response does not carry usable gaps: plain
//! string entries are wrapped, an empty gap list is replaced by one gap named
//! after the query, and a failed call gets a complete fallback analysis built
//! from catalog data alone.

use crate::heatmap::{self, Dimension};
use crate::models::{
    AnalysisSource, CompetitiveAnalysis, MarketGap, OpportunityRecord, SearchAnalysis,
};

pub const DEFAULT_GAP_SIZE: u8 = 7;
pub const DEFAULT_URGENCY: u8 = 6;
pub const DEFAULT_DIFFICULTY: u8 = 5;
pub const DEFAULT_MARKET_SIZE: &str = "$2.5B";
pub const DEFAULT_INDUSTRY: &str = "Technology";

const DEFAULT_KEY_INSIGHTS: [&str; 2] = [
    "Existing tools address this need only partially",
    "Customers are actively looking for better alternatives",
];

const FALLBACK_TITLE_WORDS: usize = 5;

/// Industry of the first relevant record, or [`DEFAULT_INDUSTRY`].
pub fn default_industry<'a>(relevant: &[&'a OpportunityRecord]) -> &'a str {
    relevant.first().map(|r| r.industry).unwrap_or(DEFAULT_INDUSTRY)
}

fn default_key_insights() -> Vec<String> {
    DEFAULT_KEY_INSIGHTS.iter().map(|s| s.to_string()).collect()
}

fn gap_with_defaults(id: String, title: String, description: String, industry: &str) -> MarketGap {
    MarketGap {
        id,
        title,
        description,
        gap_size: DEFAULT_GAP_SIZE,
        urgency: DEFAULT_URGENCY,
        difficulty: DEFAULT_DIFFICULTY,
        industry: industry.to_string(),
        estimated_market_size: DEFAULT_MARKET_SIZE.to_string(),
        key_insights: default_key_insights(),
    }
}

/// Wraps a plain-string gap entry. The title is the string, unchanged.
pub fn gap_from_text(index: usize, text: &str, industry: &str) -> MarketGap {
    gap_with_defaults(
        format!("gap-{}", index + 1),
        text.to_string(),
        format!("Underserved need in {}: {}", industry, text),
        industry,
    )
}

/// The single gap used when the model returned no gaps but the catalog
/// still matched the query.
pub fn synthesize_for_query(query: &str, relevant: &[&OpportunityRecord]) -> MarketGap {
    let query = query.trim();
    let industry = default_industry(relevant);
    gap_with_defaults(
        "gap-1".to_string(),
        format!("Enhanced {} Solutions", query),
        format!(
            "Current offerings for \"{}\" leave clear room for a more focused product.",
            query
        ),
        industry,
    )
}

/// The single gap used when the completion call failed.
///
/// Titled from the first five non-empty words of the query.
pub fn fallback_gap(query: &str, relevant: &[&OpportunityRecord]) -> MarketGap {
    let words: Vec<&str> = query.split_whitespace().take(FALLBACK_TITLE_WORDS).collect();
    let subject = if words.is_empty() {
        "Emerging".to_string()
    } else {
        words.join(" ")
    };
    let industry = default_industry(relevant);
    gap_with_defaults(
        "gap-1".to_string(),
        format!("{} Market Opportunity", subject),
        format!(
            "Demand around \"{}\" is not well served by existing {} products.",
            subject, industry
        ),
        industry,
    )
}

/// Fixed competitive analysis used on the fallback path.
pub fn placeholder_competitive_analysis() -> CompetitiveAnalysis {
    CompetitiveAnalysis {
        oversaturated_areas: vec![
            "Generic project management tools".to_string(),
            "Horizontal CRM platforms".to_string(),
        ],
        underserved_areas: vec![
            "Vertical workflows for small businesses".to_string(),
            "Automation for manual reporting".to_string(),
        ],
        emerging_trends: vec![
            "AI-assisted decision support".to_string(),
            "Usage-based pricing for SMB software".to_string(),
        ],
        risk_factors: vec![
            "Incumbents adding similar features".to_string(),
            "Long sales cycles in traditional industries".to_string(),
        ],
    }
}

/// Builds a complete analysis from catalog data alone.
///
/// The heatmap comes from the relevant records; when nothing matched, the
/// fallback gap itself is plotted as a single dimension so the result is
/// never empty.
pub fn fallback_analysis(query: &str, relevant: &[&OpportunityRecord]) -> SearchAnalysis {
    let gap = fallback_gap(query, relevant);

    let heatmap_data = if relevant.is_empty() {
        heatmap::build_from_dimensions(
            &[Dimension {
                label: gap.title.clone(),
                score: f64::from(gap.gap_size),
            }],
            &gap.industry,
        )
    } else {
        heatmap::build_from_records(relevant)
    };

    SearchAnalysis {
        query: query.trim().to_string(),
        market_gaps: vec![gap],
        heatmap_data,
        competitive_analysis: placeholder_competitive_analysis(),
        total_market_size: DEFAULT_MARKET_SIZE.to_string(),
        matched_opportunities: relevant.iter().map(|r| r.id.to_string()).collect(),
        source: AnalysisSource::Fallback,
    }
}
