//! AuditService - the async boundary: fetch, analyze, assemble, persist.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::analyzer::{CompetitiveAnalyzer, CoreAnalyzer, GeographicAnalyzer, VoiceSearchAnalyzer};
use crate::config::AuditConfig;
use crate::domain::{AuditMetadata, AuditReport};
use crate::error::{AppError, Result};
use crate::extractor::PageSignals;
use crate::repository::{AuditStore, InMemoryAuditStore};

use super::assembler::ReportAssembler;
use super::cache::TtlCache;
use super::fetcher::{validate_url, HtmlFetcher, HttpFetcher};
use super::semantic::{estimator_from_config, SemanticEstimator};

/// Run CPU-bound work on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Other(anyhow::anyhow!("analysis task failed: {}", e)))
}

/// Normalized URL and keyword list.
type CacheKey = (String, Vec<String>);

pub struct AuditService {
    fetcher: Arc<dyn HtmlFetcher>,
    semantic: Arc<dyn SemanticEstimator>,
    store: Arc<dyn AuditStore>,
    cache: TtlCache<CacheKey, AuditReport>,
}

impl AuditService {
    pub fn new(
        fetcher: Arc<dyn HtmlFetcher>,
        semantic: Arc<dyn SemanticEstimator>,
        store: Arc<dyn AuditStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            semantic,
            store,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// HTTP fetcher, semantic estimator chosen by config, in-memory store.
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let semantic = estimator_from_config(&config.semantic)?;
        tracing::debug!("Semantic estimator: {}", semantic.name());

        Ok(Self::new(
            Arc::new(HttpFetcher::new(config)?),
            semantic,
            Arc::new(InMemoryAuditStore::new()),
            config.cache_ttl(),
        ))
    }

    pub async fn run_audit(&self, url: &str, keywords: &[String]) -> Result<AuditReport> {
        let target = validate_url(url)?;
        let cache_key: CacheKey = (target.to_string(), keywords.to_vec());

        if let Some(report) = self.cache.get(&cache_key) {
            tracing::info!("Using cached report for {}", target);
            return Ok(report);
        }

        let page = self.fetcher.fetch(&target).await?;

        let metadata = AuditMetadata {
            url: target.to_string(),
            analyzed_at: Utc::now(),
            response_time_ms: page.response_time_ms,
            content_length: page.content_length,
            status_code: page.status_code,
        };

        let html = page.html;
        let final_url = page.final_url;
        let signals =
            Arc::new(run_blocking(move || PageSignals::from_html(&html, &final_url)).await?);

        let (core_signals, geo_signals, voice_signals, competitive_signals) = (
            signals.clone(),
            signals.clone(),
            signals.clone(),
            signals.clone(),
        );
        let (audit, geographic, voice_search, competitive) = tokio::try_join!(
            run_blocking(move || CoreAnalyzer::analyze(&core_signals, metadata)),
            run_blocking(move || GeographicAnalyzer::analyze(&geo_signals)),
            run_blocking(move || VoiceSearchAnalyzer::analyze(&voice_signals)),
            run_blocking(move || CompetitiveAnalyzer::analyze(&competitive_signals)),
        )?;

        let semantic = match self
            .semantic
            .estimate_semantic_quality(&signals.text, keywords)
            .await
        {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                tracing::warn!("Semantic estimate unavailable for {}: {}", target, e);
                None
            }
        };

        let mut report = ReportAssembler::assemble(
            target.as_str(),
            audit,
            geographic,
            voice_search,
            competitive,
            semantic,
        );

        let id = self.store.save(report.clone()).await?;
        report.id = Some(id);

        tracing::info!(
            "Audit complete - {} score: {}, issues: {}",
            target,
            report.audit.score(),
            report.audit.issues().len()
        );

        self.cache.insert(cache_key, report.clone());
        Ok(report)
    }

    pub async fn get_report(&self, id: &str) -> Result<AuditReport> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::ReportNotFound(id.to_string()))
    }
}
