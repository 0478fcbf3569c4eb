//! Deterministic MVP proposals and roadmaps.
//!
//! These are the fallbacks for [`crate::analysis::Analyzer::propose_mvp`] and
//! [`crate::analysis::Analyzer::plan_roadmap`], and also the base values
//! that partially decoded model answers are merged onto.

use crate::models::{MarketGap, MvpFeature, MvpProposal, ProductRoadmap, RoadmapPhase};

fn feature(name: &str, description: String, priority: &str) -> MvpFeature {
    MvpFeature {
        name: name.to_string(),
        description,
        priority: priority.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Timeline label derived from the gap's difficulty score.
fn timeline_for(difficulty: u8) -> &'static str {
    match difficulty {
        0..=3 => "2-3 months",
        4..=6 => "3-4 months",
        _ => "6-9 months",
    }
}

fn budget_for(difficulty: u8) -> &'static str {
    match difficulty {
        0..=3 => "$30K-$60K",
        4..=6 => "$75K-$150K",
        _ => "$200K-$400K",
    }
}

pub fn fallback_mvp(gap: &MarketGap) -> MvpProposal {
    MvpProposal {
        title: format!("{} MVP", gap.title),
        summary: format!(
            "A focused first product for {} teams that addresses: {}",
            gap.industry, gap.description
        ),
        target_users: vec![
            format!("Small and mid-sized {} businesses", gap.industry),
            "Operations managers handling the workflow today".to_string(),
        ],
        core_features: vec![
            feature(
                "Guided onboarding",
                "Import existing data and reach a first result within a day".to_string(),
                "High",
            ),
            feature(
                "Core workflow automation",
                format!("Automate the manual steps behind \"{}\"", gap.title),
                "High",
            ),
            feature(
                "Insights dashboard",
                "Track the metrics that prove the product is saving time".to_string(),
                "Medium",
            ),
            feature(
                "Team notifications",
                "Email and mobile alerts for exceptions".to_string(),
                "Low",
            ),
        ],
        tech_stack: strings(&["Rust (axum) API", "PostgreSQL", "React web client"]),
        timeline: timeline_for(gap.difficulty).to_string(),
        estimated_budget: budget_for(gap.difficulty).to_string(),
        success_metrics: strings(&[
            "10 paying design partners within 90 days of launch",
            "Weekly active usage above 60% of seats",
            "Net revenue retention above 100%",
        ]),
        risks: strings(&[
            "Incumbents bundling a similar feature",
            "Integration effort with customers' existing tools",
        ]),
    }
}

pub fn fallback_roadmap(mvp: &MvpProposal) -> ProductRoadmap {
    let by_priority = |priority: &str| -> Vec<String> {
        mvp.core_features
            .iter()
            .filter(|f| f.priority == priority)
            .map(|f| f.name.clone())
            .collect()
    };

    ProductRoadmap {
        title: format!("{} Roadmap", mvp.title),
        phases: vec![
            RoadmapPhase {
                name: "Discovery".to_string(),
                duration: "3-4 weeks".to_string(),
                goals: strings(&[
                    "Validate the problem with 15 customer interviews",
                    "Confirm willingness to pay",
                ]),
                deliverables: strings(&["Interview synthesis", "Clickable prototype"]),
            },
            RoadmapPhase {
                name: "MVP Build".to_string(),
                duration: mvp.timeline.clone(),
                goals: strings(&["Ship the high-priority feature set to design partners"]),
                deliverables: by_priority("High"),
            },
            RoadmapPhase {
                name: "Launch & Iterate".to_string(),
                duration: "2-3 months".to_string(),
                goals: strings(&["Convert design partners to paid plans", "Reach the first success metric"]),
                deliverables: [by_priority("Medium"), by_priority("Low")].concat(),
            },
        ],
        milestones: strings(&[
            "Problem validated",
            "First design partner onboarded",
            "Public launch",
        ]),
    }
}
