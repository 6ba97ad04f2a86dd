//! Pure heuristic analyzers. Each one reads a shared `PageSignals` and never
//! performs I/O; the free functions below are the `(html, url)` entry points.

pub mod competitive;
pub mod core;
pub mod geographic;
pub mod voice;

use serde::{Deserialize, Serialize};
use url::Url;

pub use self::competitive::CompetitiveAnalyzer;
pub use self::core::CoreAnalyzer;
pub use self::geographic::GeographicAnalyzer;
pub use self::voice::VoiceSearchAnalyzer;

use crate::domain::{
    AuditMetadata, AuditResult, CompetitiveAnalysis, GeographicAnalysis, VoiceSearchAnalysis,
};
use crate::error::{AppError, Result};
use crate::extractor::PageSignals;

/// Results of every analyzer over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAnalysis {
    pub audit: AuditResult,
    pub geographic: GeographicAnalysis,
    pub voice_search: VoiceSearchAnalysis,
    pub competitive: CompetitiveAnalysis,
}

impl FullAnalysis {
    pub fn from_signals(signals: &PageSignals, metadata: AuditMetadata) -> Self {
        Self {
            audit: CoreAnalyzer::analyze(signals, metadata),
            geographic: GeographicAnalyzer::analyze(signals),
            voice_search: VoiceSearchAnalyzer::analyze(signals),
            competitive: CompetitiveAnalyzer::analyze(signals),
        }
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| AppError::invalid_url(format!("{}: {}", url, e)))
}

fn signals_for(html: &str, url: &str) -> Result<PageSignals> {
    let url = parse_url(url)?;
    Ok(PageSignals::from_html(html, &url))
}

/// Core audit of a document that was not fetched by this crate: metadata
/// carries `response_time_ms = 0` and `status_code = 200`.
pub fn analyze(html: &str, url: &str) -> Result<AuditResult> {
    let signals = signals_for(html, url)?;
    Ok(CoreAnalyzer::analyze(
        &signals,
        AuditMetadata::for_document(url, html.len()),
    ))
}

pub fn analyze_geographic(html: &str, url: &str) -> Result<GeographicAnalysis> {
    Ok(GeographicAnalyzer::analyze(&signals_for(html, url)?))
}

pub fn analyze_voice_search(html: &str, url: &str) -> Result<VoiceSearchAnalysis> {
    Ok(VoiceSearchAnalyzer::analyze(&signals_for(html, url)?))
}

pub fn analyze_competitive(html: &str, url: &str) -> Result<CompetitiveAnalysis> {
    Ok(CompetitiveAnalyzer::analyze(&signals_for(html, url)?))
}

/// Runs every analyzer over a single parse of the document.
pub fn analyze_all(html: &str, url: &str) -> Result<FullAnalysis> {
    let signals = signals_for(html, url)?;
    Ok(FullAnalysis::from_signals(
        &signals,
        AuditMetadata::for_document(url, html.len()),
    ))
}
