//! Core data models used throughout Gap Radar.
//!
//! Catalog records are static and immutable. Everything else in this module
//! is derived per request and serialized with camelCase keys, which is the
//! shape the front-end and the completion prompts both use.

use serde::{Deserialize, Serialize};

/// Three-level scale shared by competition and difficulty labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

/// Revenue, margin and time-to-market labels of an opportunity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitPotential {
    pub revenue: &'static str,
    pub margins: &'static str,
    pub time_to_market: &'static str,
}

/// An incumbent already serving (part of) an opportunity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: &'static str,
    pub description: &'static str,
    pub market_share: &'static str,
    pub strengths: Vec<&'static str>,
    pub weaknesses: Vec<&'static str>,
    pub founded: Option<u16>,
    pub funding: Option<&'static str>,
}

/// Immutable catalog entry describing an unmet market need.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityRecord {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub industry: &'static str,
    pub pain_points: Vec<&'static str>,
    pub required_functionalities: Vec<&'static str>,
    pub market_size: &'static str,
    pub profit_potential: ProfitPotential,
    pub competition_level: Level,
    pub competitors: Vec<Competitor>,
    pub sources: Vec<&'static str>,
    pub difficulty: Level,
    pub tags: Vec<&'static str>,
}

/// An underserved market segment, either returned by the model or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketGap {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 1–10.
    pub gap_size: u8,
    /// 1–10.
    pub urgency: u8,
    /// 1–10.
    pub difficulty: u8,
    pub industry: String,
    pub estimated_market_size: String,
    pub key_insights: Vec<String>,
}

/// A single plotted point of the opportunity heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPoint {
    pub industry: String,
    pub opportunity: String,
    /// 0–100.
    pub intensity: f64,
    /// Millions of dollars.
    pub revenue: f64,
    /// 0–100.
    pub competition: f64,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveAnalysis {
    pub oversaturated_areas: Vec<String>,
    pub underserved_areas: Vec<String>,
    pub emerging_trends: Vec<String>,
    pub risk_factors: Vec<String>,
}

/// Where the gaps of a [`SearchAnalysis`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Decoded from a completion response.
    Model,
    /// Synthesized from catalog data after the completion call failed.
    Fallback,
}

/// Complete result of analysing one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalysis {
    pub query: String,
    pub market_gaps: Vec<MarketGap>,
    pub heatmap_data: Vec<HeatmapPoint>,
    pub competitive_analysis: CompetitiveAnalysis,
    pub total_market_size: String,
    pub matched_opportunities: Vec<String>,
    pub source: AnalysisSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpFeature {
    pub name: String,
    pub description: String,
    pub priority: String,
}

/// Minimum viable product proposal for a single market gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MvpProposal {
    pub title: String,
    pub summary: String,
    pub target_users: Vec<String>,
    pub core_features: Vec<MvpFeature>,
    pub tech_stack: Vec<String>,
    pub timeline: String,
    pub estimated_budget: String,
    pub success_metrics: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub name: String,
    pub duration: String,
    pub goals: Vec<String>,
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRoadmap {
    pub title: String,
    pub phases: Vec<RoadmapPhase>,
    pub milestones: Vec<String>,
}
