//! Command implementations for the `gapr` binary.
//!
//! Each `run_*` function loads what it needs from [`Config`], performs one
//! command and prints its results to stdout. Diagnostics go through
//! `tracing` to stderr.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::analysis::Analyzer;
use crate::auth::{AuthProvider, HostedAuthClient, OAuthProvider, SignUpOutcome};
use crate::completion::create_provider;
use crate::config::Config;
use crate::debounce::SuggestionFeed;
use crate::session::{SessionEvent, SessionState};
use crate::models::{OpportunityRecord, SearchAnalysis};
use crate::report::{render_printable_html, render_standalone_html, write_report, ReportInput};

fn build_analyzer(config: &Config) -> Result<Analyzer> {
    let provider = create_provider(&config.llm)?;
    Ok(Analyzer::new(Arc::from(provider), config.search.clone()))
}

fn print_record(index: usize, record: &OpportunityRecord) {
    println!("{}. {} [{}]", index + 1, record.title, record.id);
    println!(
        "    industry: {}  market: {}  competition: {}  difficulty: {}",
        record.industry,
        record.market_size,
        record.competition_level.as_str(),
        record.difficulty.as_str()
    );
    println!("    {}", record.description);
}

pub fn run_catalog(config: &Config) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    for (i, record) in analyzer.records().iter().enumerate() {
        print_record(i, record);
    }
    Ok(())
}

pub async fn run_search(config: &Config, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let analyzer = build_analyzer(config)?;
    let results = analyzer.search_opportunities(query).await;
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for (i, record) in results.iter().enumerate() {
        print_record(i, record);
    }
    Ok(())
}

fn print_analysis(analysis: &SearchAnalysis) {
    println!("Query: {}", analysis.query);
    println!("Total market size: {}", analysis.total_market_size);
    println!();

    println!("Market gaps:");
    for (i, gap) in analysis.market_gaps.iter().enumerate() {
        println!("{}. {} ({})", i + 1, gap.title, gap.industry);
        println!(
            "    size {}/10  urgency {}/10  difficulty {}/10  market {}",
            gap.gap_size, gap.urgency, gap.difficulty, gap.estimated_market_size
        );
        for insight in &gap.key_insights {
            println!("    - {}", insight);
        }
    }
    println!();

    println!("Heatmap:");
    for point in &analysis.heatmap_data {
        println!(
            "    ({}, {}) {} / {}: intensity {:.0}, revenue ${:.1}M, competition {:.0}",
            point.x,
            point.y,
            point.industry,
            point.opportunity,
            point.intensity,
            point.revenue,
            point.competition
        );
    }
    println!();

    let landscape = &analysis.competitive_analysis;
    for (label, items) in [
        ("Oversaturated", &landscape.oversaturated_areas),
        ("Underserved", &landscape.underserved_areas),
        ("Emerging trends", &landscape.emerging_trends),
        ("Risk factors", &landscape.risk_factors),
    ] {
        println!("{}: {}", label, items.join("; "));
    }
}

pub async fn run_analyze(config: &Config, query: &str, json: bool) -> Result<()> {
    if query.trim().is_empty() {
        debug!("blank query, nothing to analyze");
        return Ok(());
    }

    let analyzer = build_analyzer(config)?;
    let analysis = analyzer.analyze(query).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }
    Ok(())
}

pub async fn run_suggest(config: &Config, query: &str) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    for suggestion in analyzer.suggest(query).await {
        println!("{}", suggestion);
    }
    Ok(())
}

/// Reads queries from stdin, one per line, and prints debounced suggestions.
pub async fn run_suggest_watch(config: &Config) -> Result<()> {
    let analyzer = build_analyzer(config)?;
    let (feed, mut rx) = SuggestionFeed::new(analyzer);

    let printer = tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            if batch.suggestions.is_empty() {
                continue;
            }
            println!("> {}", batch.query);
            for suggestion in batch.suggestions {
                println!("  {}", suggestion);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        feed.update(&line);
    }
    feed.settle().await;
    drop(feed);

    printer.await?;
    Ok(())
}

pub async fn run_report(
    config: &Config,
    query: &str,
    output: &Path,
    print: bool,
    with_mvp: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    let analyzer = build_analyzer(config)?;
    let analysis = analyzer.analyze(query).await;

    let (mvp, roadmap) = match (with_mvp, analysis.market_gaps.first()) {
        (true, Some(gap)) => {
            let mvp = analyzer.propose_mvp(gap).await;
            let roadmap = analyzer.plan_roadmap(&mvp).await;
            (Some(mvp), Some(roadmap))
        }
        _ => (None, None),
    };

    let input = ReportInput {
        gaps: &analysis.market_gaps,
        total_market_size: &analysis.total_market_size,
        generated_at: Utc::now(),
        mvp: mvp.as_ref(),
        roadmap: roadmap.as_ref(),
    };
    let html = if print {
        render_printable_html(&input)?
    } else {
        render_standalone_html(&input)?
    };
    write_report(output, &html)?;

    println!(
        "Wrote report with {} gaps to {}",
        analysis.market_gaps.len(),
        output.display()
    );
    Ok(())
}

fn auth_client(config: &Config) -> Result<HostedAuthClient> {
    Ok(HostedAuthClient::from_config(&config.auth)?)
}

fn auth_session(config: &Config) -> Result<SessionState> {
    let state = SessionState::new(Arc::new(auth_client(config)?));
    state.subscribe(|event| {
        if let SessionEvent::SignedIn(session) = event {
            debug!(user = %session.user.id, "session started");
        }
    });
    Ok(state)
}

pub async fn run_sign_up(config: &Config, email: &str, password: &str) -> Result<()> {
    match auth_session(config)?.sign_up(email, password).await? {
        SignUpOutcome::SignedIn(session) => {
            println!("Signed up and signed in as {}", session.user.id);
        }
        SignUpOutcome::ConfirmationRequired(user) => {
            println!(
                "Account {} created; check {} for a confirmation link.",
                user.id,
                user.email.as_deref().unwrap_or(email)
            );
        }
    }
    Ok(())
}

pub async fn run_sign_in(config: &Config, email: &str, password: &str) -> Result<()> {
    let session = auth_session(config)?.sign_in(email, password).await?;
    println!("Signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));
    if let Some(expires_at) = session.expires_at {
        println!("Session expires {}", expires_at.to_rfc3339());
    }
    Ok(())
}

pub fn run_oauth_url(config: &Config, provider: &str) -> Result<()> {
    let provider: OAuthProvider = provider.parse()?;
    println!("{}", auth_client(config)?.authorize_url(provider)?);
    Ok(())
}
