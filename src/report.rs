//! HTML report export.
//!
//! Renders already-computed analysis data through the `templates/report.html`
//! askama template. Two variants exist: a standalone document for saving,
//! and a printable one that opens the browser's print dialog on load.

use std::path::Path;

use askama::Template;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{MarketGap, MvpProposal, ProductRoadmap};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to render report: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a report shows.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub gaps: &'a [MarketGap],
    pub total_market_size: &'a str,
    pub generated_at: DateTime<Utc>,
    pub mvp: Option<&'a MvpProposal>,
    pub roadmap: Option<&'a ProductRoadmap>,
}

/// Summary figures shown above the gap list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportStats {
    pub gap_count: usize,
    pub average_gap_size: f64,
    pub average_urgency: f64,
}

impl ReportStats {
    pub fn from_gaps(gaps: &[MarketGap]) -> Self {
        let average = |score: fn(&MarketGap) -> u8| {
            if gaps.is_empty() {
                0.0
            } else {
                gaps.iter().map(|g| f64::from(score(g))).sum::<f64>() / gaps.len() as f64
            }
        };
        Self {
            gap_count: gaps.len(),
            average_gap_size: average(|g| g.gap_size),
            average_urgency: average(|g| g.urgency),
        }
    }
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    generated_at: String,
    total_market_size: &'a str,
    gap_count: usize,
    average_gap_size: String,
    average_urgency: String,
    gaps: &'a [MarketGap],
    mvp: Option<&'a MvpProposal>,
    roadmap: Option<&'a ProductRoadmap>,
    auto_print: bool,
}

const REPORT_TITLE: &str = "Market Gap Analysis Report";

fn render(input: &ReportInput<'_>, auto_print: bool) -> Result<String, ReportError> {
    let stats = ReportStats::from_gaps(input.gaps);
    let template = ReportTemplate {
        title: REPORT_TITLE,
        generated_at: input.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        total_market_size: input.total_market_size,
        gap_count: stats.gap_count,
        average_gap_size: format!("{:.1}", stats.average_gap_size),
        average_urgency: format!("{:.1}", stats.average_urgency),
        gaps: input.gaps,
        mvp: input.mvp,
        roadmap: input.roadmap,
        auto_print,
    };
    Ok(template.render()?)
}

/// Document that triggers `window.print()` once loaded.
pub fn render_printable_html(input: &ReportInput<'_>) -> Result<String, ReportError> {
    render(input, true)
}

pub fn render_standalone_html(input: &ReportInput<'_>) -> Result<String, ReportError> {
    render(input, false)
}

/// Writes a rendered report to `path`, creating parent directories.
pub fn write_report(path: &Path, html: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}
