//! Heatmap construction.
//!
//! Points are laid out five to a row. Two input shapes are supported:
//! catalog records (revenue and competition come from the record) and
//! model-supplied "dimensions" (a label with a 0–10 score).

use crate::models::{HeatmapPoint, Level, OpportunityRecord};

const POINTS_PER_ROW: usize = 5;
const DIMENSION_COMPETITION: f64 = 50.0;
const DIMENSION_SCALE: f64 = 10.0;

/// A labelled 0–10 score, the alternate heatmap input shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub label: String,
    pub score: f64,
}

/// Maps a competition level onto the 0–100 heatmap axis.
pub fn competition_value(level: Level) -> f64 {
    match level {
        Level::Low => 30.0,
        Level::Medium => 60.0,
        Level::High => 90.0,
    }
}

/// Parses the number out of a revenue label such as `"$45M ARR potential"`.
///
/// Reads the first run of digits (with at most one `.`, thousands commas
/// skipped), so a range like `"$1.5-2B"` yields its lower bound. Returns
/// `0.0` when the label holds no number.
pub fn parse_revenue(label: &str) -> f64 {
    let Some(start) = label.find(|c: char| c.is_ascii_digit()) else {
        return 0.0;
    };

    let mut number = String::new();
    let mut seen_dot = false;
    for c in label[start..].chars() {
        match c {
            '0'..='9' => number.push(c),
            '.' if !seen_dot => {
                seen_dot = true;
                number.push(c);
            }
            ',' => {}
            _ => break,
        }
    }
    number.parse().unwrap_or(0.0)
}

/// Column and row of the `index`-th point.
pub fn grid_position(index: usize) -> (u32, u32) {
    ((index % POINTS_PER_ROW) as u32, (index / POINTS_PER_ROW) as u32)
}

/// One point per record, in input order.
pub fn build_from_records(records: &[&OpportunityRecord]) -> Vec<HeatmapPoint> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let revenue = parse_revenue(record.profit_potential.revenue);
            let (x, y) = grid_position(index);
            HeatmapPoint {
                industry: record.industry.to_string(),
                opportunity: record.title.to_string(),
                intensity: f64::min(100.0, revenue * 2.0),
                revenue,
                competition: competition_value(record.competition_level),
                x,
                y,
            }
        })
        .collect()
}

/// One point per dimension. Scores are rescaled to 0–100 and revenue is
/// derived from the rescaled intensity, in millions.
pub fn build_from_dimensions(dimensions: &[Dimension], industry: &str) -> Vec<HeatmapPoint> {
    dimensions
        .iter()
        .enumerate()
        .map(|(index, dim)| {
            let intensity = (dim.score * DIMENSION_SCALE).clamp(0.0, 100.0);
            let revenue = (intensity * 1_000_000.0) / 1_000_000.0;
            let (x, y) = grid_position(index);
            HeatmapPoint {
                industry: industry.to_string(),
                opportunity: dim.label.clone(),
                intensity,
                revenue,
                competition: DIMENSION_COMPETITION,
                x,
                y,
            }
        })
        .collect()
}
