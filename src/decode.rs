//! Decoding of untrusted completion responses.
//!
//! The model is asked for JSON but nothing enforces the shape. Decoding
//! happens in two layers:
//!
//! 1. **Root**: find a JSON object in the response text. Failure here is a
//!    [`DecodeError`] and the caller switches to the fallback path.
//! 2. **Fields**: every field is decoded by a small typed decoder returning
//!    `Result<T, DecodeError>`. A field that is absent or has the wrong type
//!    is replaced by its documented default and logged at debug level.
//!
//! Gap entries may be plain strings or objects; heatmap entries may be
//! plotted points or `{ dimension, score }` pairs.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::gaps::{self, DEFAULT_DIFFICULTY, DEFAULT_GAP_SIZE, DEFAULT_MARKET_SIZE, DEFAULT_URGENCY};
use crate::heatmap::{self, Dimension};
use crate::models::{
    AnalysisSource, CompetitiveAnalysis, HeatmapPoint, MarketGap, MvpFeature, MvpProposal,
    OpportunityRecord, ProductRoadmap, RoadmapPhase, SearchAnalysis,
};

const DEFAULT_POINT_INTENSITY: f64 = 50.0;
const DEFAULT_POINT_REVENUE: f64 = 25.0;
const DEFAULT_POINT_COMPETITION: f64 = 50.0;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response does not contain a JSON object")]
    NoJsonObject,

    #[error("response JSON is invalid: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response root is not a JSON object")]
    NotAnObject,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' should be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

// ============ Root ============

/// Extracts the first JSON object embedded in a completion text.
///
/// Handles bare JSON, JSON wrapped in Markdown code fences, and JSON
/// surrounded by prose.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, DecodeError> {
    let start = text.find('{').ok_or(DecodeError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(DecodeError::NoJsonObject)?;
    if end < start {
        return Err(DecodeError::NoJsonObject);
    }

    match serde_json::from_str::<Value>(&text[start..=end])? {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::NotAnObject),
    }
}

// ============ Field decoders ============

fn field<'a>(obj: &'a Map<String, Value>, key: &'static str) -> Result<&'a Value, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(key)),
        Some(v) => Ok(v),
    }
}

fn decode_string(obj: &Map<String, Value>, key: &'static str) -> Result<String, DecodeError> {
    match field(obj, key)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(DecodeError::WrongType {
            field: key,
            expected: "a non-empty string",
        }),
    }
}

fn decode_string_list(obj: &Map<String, Value>, key: &'static str) -> Result<Vec<String>, DecodeError> {
    let items = field(obj, key)?.as_array().ok_or(DecodeError::WrongType {
        field: key,
        expected: "an array of strings",
    })?;
    Ok(items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.to_string())
        .collect())
}

fn decode_number(obj: &Map<String, Value>, key: &'static str) -> Result<f64, DecodeError> {
    let wrong = DecodeError::WrongType {
        field: key,
        expected: "a number",
    };
    match field(obj, key)? {
        Value::Number(n) => n.as_f64().ok_or(wrong),
        Value::String(s) => {
            let parsed = heatmap::parse_revenue(s);
            if s.chars().any(|c| c.is_ascii_digit()) {
                Ok(parsed)
            } else {
                Err(wrong)
            }
        }
        _ => Err(wrong),
    }
}

fn decode_score(obj: &Map<String, Value>, key: &'static str) -> Result<u8, DecodeError> {
    let n = decode_number(obj, key)?;
    Ok(n.round().clamp(1.0, 10.0) as u8)
}

/// Unwraps a field result, logging and substituting `default` on error.
fn or_default<T>(result: Result<T, DecodeError>, default: impl FnOnce() -> T) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "using default for response field");
            default()
        }
    }
}

// ============ Market gaps ============

/// Decodes one gap entry, which may be a plain string or an object.
///
/// Objects without a usable title are rejected; every other field defaults.
pub fn decode_gap(index: usize, value: &Value, industry: &str) -> Result<MarketGap, DecodeError> {
    let obj = match value {
        Value::String(text) => return Ok(gaps::gap_from_text(index, text, industry)),
        Value::Object(obj) => obj,
        _ => {
            return Err(DecodeError::WrongType {
                field: "marketGaps[]",
                expected: "a string or an object",
            })
        }
    };

    let title = decode_string(obj, "title")?;
    let fallback = gaps::gap_from_text(index, &title, industry);

    Ok(MarketGap {
        id: or_default(decode_string(obj, "id"), || fallback.id.clone()),
        description: or_default(decode_string(obj, "description"), || {
            fallback.description.clone()
        }),
        gap_size: or_default(decode_score(obj, "gapSize"), || DEFAULT_GAP_SIZE),
        urgency: or_default(decode_score(obj, "urgency"), || DEFAULT_URGENCY),
        difficulty: or_default(decode_score(obj, "difficulty"), || DEFAULT_DIFFICULTY),
        industry: or_default(decode_string(obj, "industry"), || industry.to_string()),
        estimated_market_size: or_default(decode_string(obj, "estimatedMarketSize"), || {
            DEFAULT_MARKET_SIZE.to_string()
        }),
        key_insights: or_default(decode_string_list(obj, "keyInsights"), || {
            fallback.key_insights.clone()
        }),
        title,
    })
}

/// Decodes `marketGaps`, synthesizing a gap when none survive.
pub fn decode_gaps(
    root: &Map<String, Value>,
    query: &str,
    relevant: &[&OpportunityRecord],
) -> Vec<MarketGap> {
    let industry = gaps::default_industry(relevant);
    let entries: &[Value] = match field(root, "marketGaps") {
        Ok(Value::Array(items)) => items.as_slice(),
        Ok(_) => {
            debug!("marketGaps is not an array");
            &[]
        }
        Err(_) => &[],
    };

    let decoded: Vec<MarketGap> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, v)| match decode_gap(i, v, industry) {
            Ok(gap) => Some(gap),
            Err(e) => {
                debug!(index = i, error = %e, "dropping malformed gap entry");
                None
            }
        })
        .collect();

    if !decoded.is_empty() {
        return decoded;
    }
    if relevant.is_empty() {
        vec![gaps::fallback_gap(query, relevant)]
    } else {
        vec![gaps::synthesize_for_query(query, relevant)]
    }
}

// ============ Heatmap ============

enum HeatmapEntry {
    Point(HeatmapPoint),
    Dimension(Dimension),
}

fn decode_heatmap_entry(index: usize, value: &Value, industry: &str) -> Result<HeatmapEntry, DecodeError> {
    let obj = value.as_object().ok_or(DecodeError::WrongType {
        field: "heatmapData[]",
        expected: "an object",
    })?;

    if obj.contains_key("dimension") || (obj.contains_key("score") && !obj.contains_key("intensity")) {
        let label = decode_string(obj, "dimension").or_else(|_| decode_string(obj, "label"))?;
        let score = decode_number(obj, "score")?;
        return Ok(HeatmapEntry::Dimension(Dimension { label, score }));
    }

    let x = (index % 5) as u32;
    let y = (index / 5) as u32;
    Ok(HeatmapEntry::Point(HeatmapPoint {
        industry: or_default(decode_string(obj, "industry"), || industry.to_string()),
        opportunity: or_default(decode_string(obj, "opportunity"), || {
            format!("Opportunity {}", index + 1)
        }),
        intensity: or_default(decode_number(obj, "intensity"), || DEFAULT_POINT_INTENSITY)
            .clamp(0.0, 100.0),
        revenue: or_default(decode_number(obj, "revenue"), || DEFAULT_POINT_REVENUE),
        competition: or_default(decode_number(obj, "competition"), || {
            DEFAULT_POINT_COMPETITION
        })
        .clamp(0.0, 100.0),
        x: or_default(decode_number(obj, "x"), || f64::from(x)).max(0.0) as u32,
        y: or_default(decode_number(obj, "y"), || f64::from(y)).max(0.0) as u32,
    }))
}

/// Decodes `heatmapData`. Falls back to the relevant records, then to the
/// gaps themselves plotted as dimensions.
pub fn decode_heatmap(
    root: &Map<String, Value>,
    relevant: &[&OpportunityRecord],
    market_gaps: &[MarketGap],
) -> Vec<HeatmapPoint> {
    let industry = gaps::default_industry(relevant);
    let entries: &[Value] = match field(root, "heatmapData") {
        Ok(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };

    let mut points = Vec::new();
    let mut dimensions = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match decode_heatmap_entry(i, entry, industry) {
            Ok(HeatmapEntry::Point(p)) => points.push(p),
            Ok(HeatmapEntry::Dimension(d)) => dimensions.push(d),
            Err(e) => debug!(index = i, error = %e, "dropping malformed heatmap entry"),
        }
    }

    if !dimensions.is_empty() && points.is_empty() {
        return heatmap::build_from_dimensions(&dimensions, industry);
    }
    if !points.is_empty() {
        if !dimensions.is_empty() {
            debug!(
                points = points.len(),
                dimensions = dimensions.len(),
                "mixed heatmap shapes, plotting dimensions after points"
            );
            // Past every entry slot, so defaulted positions never collide.
            let offset = entries.len();
            for (i, mut point) in heatmap::build_from_dimensions(&dimensions, industry)
                .into_iter()
                .enumerate()
            {
                (point.x, point.y) = heatmap::grid_position(offset + i);
                points.push(point);
            }
        }
        return points;
    }
    if !relevant.is_empty() {
        return heatmap::build_from_records(relevant);
    }

    let gap_dimensions: Vec<Dimension> = market_gaps
        .iter()
        .map(|g| Dimension {
            label: g.title.clone(),
            score: f64::from(g.gap_size),
        })
        .collect();
    heatmap::build_from_dimensions(&gap_dimensions, industry)
}

// ============ Competitive analysis ============

/// Decodes `competitiveAnalysis`; absent lists keep the placeholder values.
pub fn decode_competitive_analysis(root: &Map<String, Value>) -> CompetitiveAnalysis {
    let placeholder = gaps::placeholder_competitive_analysis();
    let obj = match field(root, "competitiveAnalysis") {
        Ok(Value::Object(obj)) => obj,
        _ => return placeholder,
    };

    CompetitiveAnalysis {
        oversaturated_areas: or_default(decode_string_list(obj, "oversaturatedAreas"), || {
            placeholder.oversaturated_areas.clone()
        }),
        underserved_areas: or_default(decode_string_list(obj, "underservedAreas"), || {
            placeholder.underserved_areas.clone()
        }),
        emerging_trends: or_default(decode_string_list(obj, "emergingTrends"), || {
            placeholder.emerging_trends.clone()
        }),
        risk_factors: or_default(decode_string_list(obj, "riskFactors"), || {
            placeholder.risk_factors.clone()
        }),
    }
}

// ============ Search analysis ============

/// Decodes a full analysis from a completion response.
///
/// Only a root-level failure is an error; everything below the root is
/// defaulted.
pub fn decode_analysis(
    text: &str,
    query: &str,
    relevant: &[&OpportunityRecord],
) -> Result<SearchAnalysis, DecodeError> {
    let root = extract_json_object(text)?;

    let market_gaps = decode_gaps(&root, query, relevant);
    let heatmap_data = decode_heatmap(&root, relevant, &market_gaps);

    Ok(SearchAnalysis {
        query: query.trim().to_string(),
        heatmap_data,
        competitive_analysis: decode_competitive_analysis(&root),
        total_market_size: or_default(decode_string(&root, "totalMarketSize"), || {
            DEFAULT_MARKET_SIZE.to_string()
        }),
        matched_opportunities: relevant.iter().map(|r| r.id.to_string()).collect(),
        source: AnalysisSource::Model,
        market_gaps,
    })
}

// ============ Suggestions ============

/// Decodes `{ "suggestions": [...] }` or a bare JSON array of strings.
pub fn decode_suggestions(text: &str, limit: usize) -> Result<Vec<String>, DecodeError> {
    let trimmed = text.trim();
    let items: Vec<String> = if trimmed.starts_with('[') {
        let value: Value = serde_json::from_str(trimmed)?;
        value
            .as_array()
            .ok_or(DecodeError::NotAnObject)?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    } else {
        let root = extract_json_object(trimmed)?;
        decode_string_list(&root, "suggestions")?
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(limit)
        .collect())
}

// ============ MVP proposal ============

fn decode_feature(value: &Value) -> Option<MvpFeature> {
    match value {
        Value::String(name) => Some(MvpFeature {
            name: name.clone(),
            description: String::new(),
            priority: "Medium".to_string(),
        }),
        Value::Object(obj) => {
            let name = decode_string(obj, "name").ok()?;
            Some(MvpFeature {
                name,
                description: decode_string(obj, "description").unwrap_or_default(),
                priority: or_default(decode_string(obj, "priority"), || "Medium".to_string()),
            })
        }
        _ => None,
    }
}

/// Decodes an MVP proposal, filling gaps from `fallback`.
pub fn decode_mvp(text: &str, fallback: &MvpProposal) -> Result<MvpProposal, DecodeError> {
    let root = extract_json_object(text)?;

    let core_features: Vec<MvpFeature> = match field(&root, "coreFeatures") {
        Ok(Value::Array(items)) => items.iter().filter_map(decode_feature).collect(),
        _ => Vec::new(),
    };

    Ok(MvpProposal {
        title: or_default(decode_string(&root, "title"), || fallback.title.clone()),
        summary: or_default(decode_string(&root, "summary"), || fallback.summary.clone()),
        target_users: or_default(decode_string_list(&root, "targetUsers"), || {
            fallback.target_users.clone()
        }),
        core_features: if core_features.is_empty() {
            fallback.core_features.clone()
        } else {
            core_features
        },
        tech_stack: or_default(decode_string_list(&root, "techStack"), || {
            fallback.tech_stack.clone()
        }),
        timeline: or_default(decode_string(&root, "timeline"), || fallback.timeline.clone()),
        estimated_budget: or_default(decode_string(&root, "estimatedBudget"), || {
            fallback.estimated_budget.clone()
        }),
        success_metrics: or_default(decode_string_list(&root, "successMetrics"), || {
            fallback.success_metrics.clone()
        }),
        risks: or_default(decode_string_list(&root, "risks"), || fallback.risks.clone()),
    })
}

// ============ Roadmap ============

fn decode_phase(value: &Value) -> Option<RoadmapPhase> {
    let obj = value.as_object()?;
    Some(RoadmapPhase {
        name: decode_string(obj, "name").ok()?,
        duration: or_default(decode_string(obj, "duration"), || "TBD".to_string()),
        goals: decode_string_list(obj, "goals").unwrap_or_default(),
        deliverables: decode_string_list(obj, "deliverables").unwrap_or_default(),
    })
}

/// Decodes a product roadmap, filling gaps from `fallback`.
pub fn decode_roadmap(text: &str, fallback: &ProductRoadmap) -> Result<ProductRoadmap, DecodeError> {
    let root = extract_json_object(text)?;

    let phases: Vec<RoadmapPhase> = match field(&root, "phases") {
        Ok(Value::Array(items)) => items.iter().filter_map(decode_phase).collect(),
        _ => Vec::new(),
    };

    Ok(ProductRoadmap {
        title: or_default(decode_string(&root, "title"), || fallback.title.clone()),
        phases: if phases.is_empty() {
            fallback.phases.clone()
        } else {
            phases
        },
        milestones: or_default(decode_string_list(&root, "milestones"), || {
            fallback.milestones.clone()
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{catalog, find};
    use crate::relevance::{relevant_opportunities, FALLBACK_SEARCH_THRESHOLD};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_plain_object() {
        let map = extract_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_extract_fenced_object() {
        let text = "Here you go:\n```json\n{\"marketGaps\": []}\n```\nHope it helps.";
        let map = extract_json_object(text).unwrap();
        assert!(map.contains_key("marketGaps"));
    }

    #[test]
    fn test_extract_errors() {
        assert!(matches!(
            extract_json_object("no json here"),
            Err(DecodeError::NoJsonObject)
        ));
        assert!(matches!(
            extract_json_object("{ not json }"),
            Err(DecodeError::InvalidJson(_))
        ));
        assert!(matches!(
            extract_json_object("} backwards {"),
            Err(DecodeError::NoJsonObject)
        ));
    }

    #[test]
    fn test_string_gap_title_roundtrip() {
        let text = "Automated lien waiver collection";
        let gap = decode_gap(0, &Value::String(text.to_string()), "Construction").unwrap();
        assert_eq!(gap.title, text);
    }

    #[test]
    fn test_object_gap_defaults_wrong_types() {
        let value = serde_json::json!({
            "title": "Scheduling for solo therapists",
            "gapSize": "nine",
            "urgency": 12,
            "difficulty": 2.4,
            "keyInsights": "not a list"
        });
        let gap = decode_gap(2, &value, "Healthcare").unwrap();
        assert_eq!(gap.title, "Scheduling for solo therapists");
        assert_eq!(gap.id, "gap-3");
        assert_eq!(gap.gap_size, 7);
        assert_eq!(gap.urgency, 10);
        assert_eq!(gap.difficulty, 2);
        assert_eq!(gap.industry, "Healthcare");
        assert_eq!(gap.key_insights.len(), 2);
    }

    #[test]
    fn test_object_gap_without_title_rejected() {
        let value = serde_json::json!({ "description": "no title" });
        assert!(matches!(
            decode_gap(0, &value, "Technology"),
            Err(DecodeError::MissingField("title"))
        ));
    }

    #[test]
    fn test_empty_gaps_with_two_relevant_records() {
        let relevant = relevant_opportunities("construction", catalog(), FALLBACK_SEARCH_THRESHOLD);
        assert_eq!(relevant.len(), 2);

        let analysis =
            decode_analysis(r#"{"marketGaps": []}"#, "construction", &relevant).unwrap();
        assert_eq!(analysis.market_gaps.len(), 1);
        assert_eq!(analysis.market_gaps[0].title, "Enhanced construction Solutions");
        assert_eq!(analysis.source, AnalysisSource::Model);
    }

    #[test]
    fn test_mixed_gap_entries() {
        let text = r#"{
            "marketGaps": [
                "Plain string gap",
                {"title": "Structured gap", "gapSize": 9, "industry": "Logistics"},
                42,
                {"description": "missing title"}
            ]
        }"#;
        let analysis = decode_analysis(text, "fleet", &[]).unwrap();
        let titles: Vec<&str> = analysis.market_gaps.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Plain string gap", "Structured gap"]);
        assert_eq!(analysis.market_gaps[1].gap_size, 9);
        assert_eq!(analysis.market_gaps[1].industry, "Logistics");
    }

    #[test]
    fn test_no_gaps_no_relevant_still_non_empty() {
        let analysis = decode_analysis("{}", "underwater basket weaving", &[]).unwrap();
        assert_eq!(analysis.market_gaps.len(), 1);
        assert!(!analysis.heatmap_data.is_empty());
    }

    #[test]
    fn test_heatmap_points_with_defaults() {
        let text = r#"{
            "heatmapData": [
                {"industry": "Food Service", "opportunity": "Waste", "intensity": 140, "revenue": "$30M", "competition": 30},
                {"opportunity": "Ordering"}
            ]
        }"#;
        let record = find("restaurant-inventory-forecasting").unwrap();
        let analysis = decode_analysis(text, "restaurant", &[record]).unwrap();
        let points = &analysis.heatmap_data;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].intensity, 100.0);
        assert_eq!(points[0].revenue, 30.0);
        assert_eq!(points[1].industry, "Food Service");
        assert_eq!(points[1].intensity, 50.0);
        assert_eq!(points[1].competition, 50.0);
        assert_eq!((points[1].x, points[1].y), (1, 0));
    }

    #[test]
    fn test_heatmap_dimension_shape() {
        let text = r#"{
            "heatmapData": [
                {"dimension": "Automation", "score": 8},
                {"dimension": "Mobile", "score": 3}
            ]
        }"#;
        let analysis = decode_analysis(text, "site", &[]).unwrap();
        let points = &analysis.heatmap_data;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].intensity, 80.0);
        assert_eq!(points[0].competition, 50.0);
        assert_eq!(points[1].opportunity, "Mobile");
    }

    #[test]
    fn test_heatmap_mixed_shapes_keep_dimensions() {
        let text = r#"{
            "heatmapData": [
                {"industry": "Logistics", "opportunity": "Routing", "intensity": 70, "revenue": 20, "competition": 40},
                {"dimension": "Telematics", "score": 6},
                {"industry": "Logistics", "opportunity": "Parts", "intensity": 55, "revenue": 12, "competition": 60}
            ]
        }"#;
        let analysis = decode_analysis(text, "fleet", &[]).unwrap();
        let labels: Vec<&str> = analysis
            .heatmap_data
            .iter()
            .map(|p| p.opportunity.as_str())
            .collect();
        assert_eq!(labels, vec!["Routing", "Parts", "Telematics"]);

        let telematics = &analysis.heatmap_data[2];
        assert_eq!(telematics.intensity, 60.0);
        assert_eq!(telematics.competition, 50.0);
        assert_eq!((telematics.x, telematics.y), (3, 0));
    }

    #[test]
    fn test_heatmap_falls_back_to_records() {
        let record = find("fleet-predictive-maintenance").unwrap();
        let analysis = decode_analysis(r#"{"heatmapData": "oops"}"#, "fleet", &[record]).unwrap();
        assert_eq!(analysis.heatmap_data.len(), 1);
        assert_eq!(analysis.heatmap_data[0].competition, 60.0);
        assert_eq!(analysis.heatmap_data[0].revenue, 40.0);
    }

    #[test]
    fn test_competitive_analysis_partial() {
        let text = r#"{
            "competitiveAnalysis": {
                "oversaturatedAreas": ["Accounting software"],
                "riskFactors": 7
            }
        }"#;
        let analysis = decode_analysis(text, "tax", &[]).unwrap();
        let placeholder = gaps::placeholder_competitive_analysis();
        assert_eq!(
            analysis.competitive_analysis.oversaturated_areas,
            vec!["Accounting software".to_string()]
        );
        assert_eq!(analysis.competitive_analysis.risk_factors, placeholder.risk_factors);
        assert_eq!(
            analysis.competitive_analysis.underserved_areas,
            placeholder.underserved_areas
        );
    }

    #[test]
    fn test_competitive_analysis_absent() {
        let analysis = decode_analysis("{}", "tax", &[]).unwrap();
        assert_eq!(
            analysis.competitive_analysis,
            gaps::placeholder_competitive_analysis()
        );
        assert_eq!(analysis.total_market_size, "$2.5B");
    }

    #[test]
    fn test_root_not_object() {
        assert!(decode_analysis("[1, 2, 3]", "q", &[]).is_err());
    }

    #[test]
    fn test_decode_suggestions_shapes() {
        let a = decode_suggestions(r#"{"suggestions": ["a b", " ", "c"]}"#, 5).unwrap();
        assert_eq!(a, vec!["a b".to_string(), "c".to_string()]);
        let b = decode_suggestions(r#"["one", "two", "three"]"#, 2).unwrap();
        assert_eq!(b, vec!["one".to_string(), "two".to_string()]);
        assert!(decode_suggestions("nothing", 5).is_err());
    }

    #[test]
    fn test_decode_mvp_partial() {
        let fallback = MvpProposal {
            title: "Fallback".to_string(),
            summary: "s".to_string(),
            target_users: vec!["u".to_string()],
            core_features: vec![MvpFeature {
                name: "f".to_string(),
                description: String::new(),
                priority: "High".to_string(),
            }],
            tech_stack: vec!["Rust".to_string()],
            timeline: "3 months".to_string(),
            estimated_budget: "$50K".to_string(),
            success_metrics: vec![],
            risks: vec![],
        };
        let text = r#"{"title": "SiteSnap", "coreFeatures": ["Photo capture", {"name": "Alerts", "priority": "High"}]}"#;
        let mvp = decode_mvp(text, &fallback).unwrap();
        assert_eq!(mvp.title, "SiteSnap");
        assert_eq!(mvp.core_features.len(), 2);
        assert_eq!(mvp.core_features[0].priority, "Medium");
        assert_eq!(mvp.core_features[1].priority, "High");
        assert_eq!(mvp.tech_stack, fallback.tech_stack);
        assert_eq!(mvp.timeline, "3 months");
    }

    #[test]
    fn test_decode_roadmap_drops_unnamed_phases() {
        let fallback = ProductRoadmap {
            title: "Roadmap".to_string(),
            phases: vec![],
            milestones: vec!["Launch".to_string()],
        };
        let text = r#"{"phases": [{"name": "Discovery", "duration": "4 weeks", "goals": ["Interviews"]}, {"duration": "x"}]}"#;
        let roadmap = decode_roadmap(text, &fallback).unwrap();
        assert_eq!(roadmap.phases.len(), 1);
        assert_eq!(roadmap.phases[0].name, "Discovery");
        assert!(roadmap.phases[0].deliverables.is_empty());
        assert_eq!(roadmap.milestones, vec!["Launch".to_string()]);
    }
}
