//! Query analysis service.
//!
//! [`Analyzer`] ties the pipeline together:
//!
//! ```text
//! query ──▶ tokenize ──▶ score catalog ──▶ relevant records ──┐
//!                                                             ├──▶ gaps / heatmap / landscape
//! query + records ──▶ prompt ──▶ completion ──▶ decode ───────┘
//!                                      │
//!                                      └── error ──▶ deterministic fallback
//! ```
//!
//! No operation here returns an error. Provider and decode failures are
//! logged and replaced by catalog-derived results.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog;
use crate::completion::CompletionProvider;
use crate::config::SearchConfig;
use crate::decode;
use crate::gaps;
use crate::models::{MarketGap, MvpProposal, OpportunityRecord, ProductRoadmap, SearchAnalysis};
use crate::planning;
use crate::prompts;
use crate::relevance::{
    query_fingerprint, relevant_opportunities, FALLBACK_SEARCH_THRESHOLD, PRIMARY_SEARCH_THRESHOLD,
};

#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn CompletionProvider>,
    records: &'static [OpportunityRecord],
    search: SearchConfig,
}

impl Analyzer {
    /// Analyzer over the built-in catalog.
    pub fn new(provider: Arc<dyn CompletionProvider>, search: SearchConfig) -> Self {
        Self::with_catalog(provider, search, catalog::catalog())
    }

    pub fn with_catalog(
        provider: Arc<dyn CompletionProvider>,
        search: SearchConfig,
        records: &'static [OpportunityRecord],
    ) -> Self {
        Self {
            provider,
            records,
            search,
        }
    }

    pub fn records(&self) -> &'static [OpportunityRecord] {
        self.records
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    /// Primary search path.
    ///
    /// A blank query returns immediately with no results. Otherwise waits
    /// the configured search latency and returns the records scoring above
    /// [`PRIMARY_SEARCH_THRESHOLD`], in catalog order.
    pub async fn search_opportunities(&self, query: &str) -> Vec<&'static OpportunityRecord> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        if self.search.search_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.search.search_delay_ms)).await;
        }

        let matches = relevant_opportunities(query, self.records, PRIMARY_SEARCH_THRESHOLD);
        info!(
            query = %query_fingerprint(query),
            matches = matches.len(),
            "primary search complete"
        );
        matches
    }

    /// Full gap analysis of a query.
    ///
    /// Records above [`FALLBACK_SEARCH_THRESHOLD`] give the model context and
    /// drive every synthesized default. The completion provider is called at
    /// most once.
    pub async fn analyze(&self, query: &str) -> SearchAnalysis {
        let relevant = relevant_opportunities(query, self.records, FALLBACK_SEARCH_THRESHOLD);
        let fingerprint = query_fingerprint(query);

        if query.trim().is_empty() {
            debug!("blank query, skipping completion call");
            return gaps::fallback_analysis(query, &relevant);
        }

        let prompt = prompts::analysis_prompt(query, &relevant);
        let analysis = match self.provider.complete(&prompt).await {
            Ok(text) => match decode::decode_analysis(&text, query, &relevant) {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!(query = %fingerprint, error = %e, "undecodable analysis response, using fallback");
                    gaps::fallback_analysis(query, &relevant)
                }
            },
            Err(e) => {
                warn!(query = %fingerprint, error = %e, "analysis call failed, using fallback");
                gaps::fallback_analysis(query, &relevant)
            }
        };

        info!(
            query = %fingerprint,
            model = self.provider.model_name(),
            relevant = relevant.len(),
            gaps = analysis.market_gaps.len(),
            source = ?analysis.source,
            "analysis complete"
        );
        analysis
    }

    /// Query completions for a partially typed query.
    ///
    /// A blank input issues no request. Failures yield an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        if partial.trim().is_empty() {
            return Vec::new();
        }

        let limit = self.search.max_suggestions;
        let prompt = prompts::suggestions_prompt(partial, limit);
        match self.provider.complete(&prompt).await {
            Ok(text) => decode::decode_suggestions(&text, limit).unwrap_or_else(|e| {
                warn!(error = %e, "undecodable suggestions response");
                Vec::new()
            }),
            Err(e) => {
                warn!(error = %e, "suggestions call failed");
                Vec::new()
            }
        }
    }

    /// MVP proposal for one gap, model-generated when possible.
    pub async fn propose_mvp(&self, gap: &MarketGap) -> MvpProposal {
        let fallback = planning::fallback_mvp(gap);
        match self.provider.complete(&prompts::mvp_prompt(gap)).await {
            Ok(text) => decode::decode_mvp(&text, &fallback).unwrap_or_else(|e| {
                warn!(gap = %gap.id, error = %e, "undecodable MVP response, using fallback");
                fallback
            }),
            Err(e) => {
                warn!(gap = %gap.id, error = %e, "MVP call failed, using fallback");
                fallback
            }
        }
    }

    /// Phased roadmap for an MVP proposal, model-generated when possible.
    pub async fn plan_roadmap(&self, mvp: &MvpProposal) -> ProductRoadmap {
        let fallback = planning::fallback_roadmap(mvp);
        match self.provider.complete(&prompts::roadmap_prompt(mvp)).await {
            Ok(text) => decode::decode_roadmap(&text, &fallback).unwrap_or_else(|e| {
                warn!(error = %e, "undecodable roadmap response, using fallback");
                fallback
            }),
            Err(e) => {
                warn!(error = %e, "roadmap call failed, using fallback");
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, DisabledProvider, Prompt};
    use crate::models::AnalysisSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed response and counts calls.
    struct ScriptedProvider {
        response: String,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: response.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _prompt: &Prompt) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    fn no_delay() -> SearchConfig {
        SearchConfig {
            search_delay_ms: 0,
            ..SearchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_blank_query_is_ignored() {
        let provider = ScriptedProvider::new(r#"{"suggestions": ["x"]}"#);
        let analyzer = Analyzer::new(provider.clone(), no_delay());

        assert!(analyzer.search_opportunities("   ").await.is_empty());
        assert!(analyzer.suggest("").await.is_empty());
        analyzer.analyze("  ").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_search_threshold() {
        let analyzer = Analyzer::new(Arc::new(DisabledProvider), no_delay());
        let results = analyzer.search_opportunities("construction").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "construction-progress-tracking");
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_search_waits_configured_delay() {
        let analyzer = Analyzer::new(Arc::new(DisabledProvider), SearchConfig::default());
        let started = tokio::time::Instant::now();
        analyzer.search_opportunities("fleet maintenance").await;
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_failed_call_falls_back() {
        let analyzer = Analyzer::new(Arc::new(DisabledProvider), no_delay());
        let analysis = analyzer.analyze("construction progress tracking").await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
        assert_eq!(analysis.market_gaps.len(), 1);
        assert_eq!(
            analysis.market_gaps[0].title,
            "construction progress tracking Market Opportunity"
        );
        assert_eq!(
            analysis.competitive_analysis,
            gaps::placeholder_competitive_analysis()
        );
        assert!(analysis
            .matched_opportunities
            .contains(&"construction-progress-tracking".to_string()));
    }

    #[tokio::test]
    async fn test_undecodable_response_falls_back() {
        let provider = ScriptedProvider::new("Sorry, I can't help with that.");
        let analyzer = Analyzer::new(provider.clone(), no_delay());
        let analysis = analyzer.analyze("restaurant inventory").await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_gaps_synthesized_from_query() {
        let provider = ScriptedProvider::new(r#"{"marketGaps": []}"#);
        let analyzer = Analyzer::new(provider, no_delay());
        let analysis = analyzer.analyze("construction").await;
        assert_eq!(analysis.source, AnalysisSource::Model);
        assert_eq!(analysis.market_gaps.len(), 1);
        assert_eq!(analysis.market_gaps[0].title, "Enhanced construction Solutions");
        assert_eq!(analysis.heatmap_data.len(), 2);
    }

    #[tokio::test]
    async fn test_suggestions_truncated_to_limit() {
        let provider =
            ScriptedProvider::new(r#"{"suggestions": ["a", "b", "c", "d", "e", "f", "g"]}"#);
        let analyzer = Analyzer::new(provider, no_delay());
        assert_eq!(analyzer.suggest("rest").await.len(), 5);
    }

    #[tokio::test]
    async fn test_mvp_and_roadmap_fallbacks() {
        let analyzer = Analyzer::new(Arc::new(DisabledProvider), no_delay());
        let gap = gaps::gap_from_text(0, "Clinic waitlist backfill", "Healthcare");
        let mvp = analyzer.propose_mvp(&gap).await;
        assert_eq!(mvp, planning::fallback_mvp(&gap));
        let roadmap = analyzer.plan_roadmap(&mvp).await;
        assert_eq!(roadmap, planning::fallback_roadmap(&mvp));
    }
}
