//! Query normalization and keyword relevance scoring.
//!
//! A query is split on whitespace and lower-cased. Each token earns a fixed
//! weight for every catalog field it appears in as a substring:
//!
//! | Field | Weight |
//! |-------|--------|
//! | title | 0.30 |
//! | description | 0.20 |
//! | industry | 0.20 |
//! | any tag | 0.10 |
//! | any pain point | 0.15 |
//!
//! Weights are summed across tokens and the total is clamped to `1.0`.
//!
//! Two call sites use two different cut-offs: the primary search path keeps
//! records above [`PRIMARY_SEARCH_THRESHOLD`], the analysis/fallback path
//! keeps records above [`FALLBACK_SEARCH_THRESHOLD`].

use sha2::{Digest, Sha256};

use crate::models::OpportunityRecord;

pub const PRIMARY_SEARCH_THRESHOLD: f64 = 0.6;
pub const FALLBACK_SEARCH_THRESHOLD: f64 = 0.3;

const TITLE_WEIGHT: f64 = 0.30;
const DESCRIPTION_WEIGHT: f64 = 0.20;
const INDUSTRY_WEIGHT: f64 = 0.20;
const TAG_WEIGHT: f64 = 0.10;
const PAIN_POINT_WEIGHT: f64 = 0.15;

/// A catalog record paired with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredOpportunity<'a> {
    pub record: &'a OpportunityRecord,
    pub score: f64,
}

/// Lower-cases the query and splits it on whitespace.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

/// Scores one record against a raw query. Always in `[0.0, 1.0]`.
pub fn score_opportunity_relevance(query: &str, record: &OpportunityRecord) -> f64 {
    score_tokens(&tokenize(query), record)
}

fn score_tokens(tokens: &[String], record: &OpportunityRecord) -> f64 {
    let title = record.title.to_lowercase();
    let description = record.description.to_lowercase();
    let industry = record.industry.to_lowercase();
    let tags: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();
    let pain_points: Vec<String> = record.pain_points.iter().map(|p| p.to_lowercase()).collect();

    let mut score = 0.0;
    for token in tokens {
        let token = token.as_str();
        if title.contains(token) {
            score += TITLE_WEIGHT;
        }
        if description.contains(token) {
            score += DESCRIPTION_WEIGHT;
        }
        if industry.contains(token) {
            score += INDUSTRY_WEIGHT;
        }
        if tags.iter().any(|t| t.contains(token)) {
            score += TAG_WEIGHT;
        }
        if pain_points.iter().any(|p| p.contains(token)) {
            score += PAIN_POINT_WEIGHT;
        }
    }

    f64::min(score, 1.0)
}

/// Scores every record, preserving catalog order.
pub fn score_catalog<'a>(query: &str, records: &'a [OpportunityRecord]) -> Vec<ScoredOpportunity<'a>> {
    let tokens = tokenize(query);
    records
        .iter()
        .map(|record| ScoredOpportunity {
            record,
            score: score_tokens(&tokens, record),
        })
        .collect()
}

/// Returns the records whose score strictly exceeds `threshold`, in catalog order.
pub fn relevant_opportunities<'a>(
    query: &str,
    records: &'a [OpportunityRecord],
    threshold: f64,
) -> Vec<&'a OpportunityRecord> {
    score_catalog(query, records)
        .into_iter()
        .filter(|s| s.score > threshold)
        .map(|s| s.record)
        .collect()
}

/// Short, stable fingerprint of a query for log lines, so raw user text
/// never ends up in logs.
pub fn query_fingerprint(query: &str) -> String {
    let digest = Sha256::digest(query.trim().as_bytes());
    hex::encode(&digest[..6])
}
