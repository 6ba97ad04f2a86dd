//! Audit entities - issues, scores and the per-analyzer result shapes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ====== Enums ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Points deducted from a 100-point score for one issue of this severity.
    pub fn penalty(&self) -> u32 {
        match self {
            Severity::High => 15,
            Severity::Medium => 10,
            Severity::Low => 5,
        }
    }
}

/// Shared low/medium/high scale used for priorities, difficulty and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

// ====== Issues ======

/// A single detected condition. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditIssue {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl AuditIssue {
    pub fn new(kind: &str, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            severity,
            description: description.into(),
            element: None,
            recommendation: None,
        }
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }
}

/// Apply the weighted-penalty model: 100 minus 15/10/5 per high/medium/low
/// issue, clamped to `[0, 100]`.
pub fn penalty_score(issues: &[AuditIssue]) -> u8 {
    let penalty: u32 = issues.iter().map(|i| i.severity.penalty()).sum();
    100u32.saturating_sub(penalty) as u8
}

/// Clamp a signed running score into `[0, 100]`.
pub fn clamp_score(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

// ====== Core audit ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMetadata {
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    pub response_time_ms: u64,
    pub content_length: usize,
    pub status_code: u16,
}

impl AuditMetadata {
    /// Metadata for a document analyzed without a fetch.
    pub fn for_document(url: &str, content_length: usize) -> Self {
        Self {
            url: url.to_string(),
            analyzed_at: Utc::now(),
            response_time_ms: 0,
            content_length,
            status_code: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuditResultFields")]
pub struct AuditResult {
    score: u8,
    issues: Vec<AuditIssue>,
    pub recommendations: Vec<String>,
    pub metadata: AuditMetadata,
}

/// Wire shape of [`AuditResult`]; a serialized `score` is ignored and recomputed.
#[derive(Deserialize)]
struct AuditResultFields {
    issues: Vec<AuditIssue>,
    recommendations: Vec<String>,
    metadata: AuditMetadata,
}

impl From<AuditResultFields> for AuditResult {
    fn from(fields: AuditResultFields) -> Self {
        Self::new(fields.issues, fields.recommendations, fields.metadata)
    }
}

impl AuditResult {
    /// The score is always derived from `issues`.
    pub fn new(issues: Vec<AuditIssue>, recommendations: Vec<String>, metadata: AuditMetadata) -> Self {
        Self {
            score: penalty_score(&issues),
            issues,
            recommendations,
            metadata,
        }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn issues(&self) -> &[AuditIssue] {
        &self.issues
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

// ====== Geographic ======

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HreflangTag {
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub href: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicAnalysis {
    pub hreflang_tags: Vec<HreflangTag>,
    pub local_seo_score: u8,
    pub languages_detected: BTreeSet<String>,
    pub regions_detected: BTreeSet<String>,
    pub issues: Vec<AuditIssue>,
    pub recommendations: Vec<String>,
}

// ====== Voice search ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Who,
    What,
    When,
    Where,
    Why,
    How,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 6] = [
        QuestionKind::Who,
        QuestionKind::What,
        QuestionKind::When,
        QuestionKind::Where,
        QuestionKind::Why,
        QuestionKind::How,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Who => "who",
            QuestionKind::What => "what",
            QuestionKind::When => "when",
            QuestionKind::Where => "where",
            QuestionKind::Why => "why",
            QuestionKind::How => "how",
        }
    }

    /// Map a leading word to its bucket. Auxiliary interrogatives count as "what".
    pub fn from_leading_word(word: &str) -> Option<Self> {
        match word {
            "who" => Some(QuestionKind::Who),
            "what" | "which" | "can" | "does" | "is" | "are" | "will" | "should" => {
                Some(QuestionKind::What)
            }
            "when" => Some(QuestionKind::When),
            "where" => Some(QuestionKind::Where),
            "why" => Some(QuestionKind::Why),
            "how" => Some(QuestionKind::How),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPattern {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub count: usize,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTailOpportunity {
    pub keyword: String,
    pub intent: String,
    pub difficulty: Level,
    pub opportunity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSearchAnalysis {
    pub question_patterns: Vec<QuestionPattern>,
    pub featured_snippet_score: u8,
    pub answer_readiness_score: u8,
    pub conversational_keywords: Vec<String>,
    pub long_tail_opportunities: Vec<LongTailOpportunity>,
    pub issues: Vec<AuditIssue>,
    pub recommendations: Vec<String>,
}

// ====== Competitive ======

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentGap {
    pub topic: String,
    pub priority: Level,
    pub description: String,
    pub opportunity: String,
}

/// Search volume and difficulty are fixed placeholders, not search data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordOpportunity {
    pub keyword: String,
    pub search_volume: u32,
    pub difficulty: u8,
    pub intent: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorStrength {
    pub area: String,
    pub description: String,
    pub action_item: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklinkComparison {
    pub estimated_backlinks: u32,
    pub quality: Level,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMetrics {
    pub estimated_authority: u8,
    pub content_quality: u8,
    pub technical_seo: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpEstimate {
    pub keyword: String,
    pub estimated_position: u32,
    pub opportunity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveAnalysis {
    /// Always true: every field is derived from the single input document.
    pub estimated: bool,
    pub competitor_urls: Vec<String>,
    pub content_gaps: Vec<ContentGap>,
    pub keyword_opportunities: Vec<KeywordOpportunity>,
    pub competitor_strengths: Vec<CompetitorStrength>,
    pub backlink_comparison: BacklinkComparison,
    pub domain_metrics: DomainMetrics,
    pub serp_positions: Vec<SerpEstimate>,
}

// ====== Semantic ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Produced by a configured language-model backend.
    Backend,
    /// Deterministic heuristic estimate.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub topic_relevance: u8,
    pub semantic_keywords: Vec<String>,
    pub content_depth: u8,
    pub entity_recognition: Vec<String>,
    pub readability_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnalysis {
    pub source: AnalysisSource,
    pub semantic_score: u8,
    pub issues: Vec<AuditIssue>,
    pub recommendations: Vec<String>,
    pub content_analysis: ContentAnalysis,
}

// ====== Assembled report ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Technical,
    OnPage,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueBucket {
    pub score: u8,
    pub issues: Vec<AuditIssue>,
}

impl IssueBucket {
    pub fn from_issues(issues: Vec<AuditIssue>) -> Self {
        Self {
            score: penalty_score(&issues),
            issues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub audit: AuditResult,
    pub technical_seo: IssueBucket,
    pub on_page_seo: IssueBucket,
    pub semantic_seo: IssueBucket,
    pub geographic: GeographicAnalysis,
    pub voice_search: VoiceSearchAnalysis,
    pub competitive: CompetitiveAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> AuditIssue {
        AuditIssue::new("test", severity, "test issue")
    }

    #[test]
    fn penalty_score_applies_weights() {
        let issues = vec![issue(Severity::High), issue(Severity::Medium), issue(Severity::Low)];
        assert_eq!(penalty_score(&issues), 70);
        assert_eq!(penalty_score(&[]), 100);
    }

    #[test]
    fn penalty_score_is_clamped_and_monotonic() {
        let mut issues = Vec::new();
        let mut previous = penalty_score(&issues);
        for _ in 0..10 {
            issues.push(issue(Severity::High));
            let next = penalty_score(&issues);
            assert!(next <= previous);
            previous = next;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn deserialized_score_is_recomputed_from_issues() {
        let result = AuditResult::new(
            vec![issue(Severity::High)],
            Vec::new(),
            AuditMetadata::for_document("https://example.com/", 0),
        );
        let mut json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score"], 85);

        json["score"] = serde_json::json!(100);
        let restored: AuditResult = serde_json::from_value(json).unwrap();
        assert_eq!(restored.score(), 85);
        assert_eq!(restored, result);
    }

    #[test]
    fn auxiliary_interrogatives_map_to_what() {
        for word in ["which", "can", "does", "is", "are", "will", "should"] {
            assert_eq!(QuestionKind::from_leading_word(word), Some(QuestionKind::What));
        }
        assert_eq!(QuestionKind::from_leading_word("how"), Some(QuestionKind::How));
        assert_eq!(QuestionKind::from_leading_word("the"), None);
    }

    #[test]
    fn issue_serializes_type_key() {
        let json = serde_json::to_value(
            AuditIssue::new("missing-title", Severity::High, "Page is missing a title tag"),
        )
        .unwrap();
        assert_eq!(json["type"], "missing-title");
        assert_eq!(json["severity"], "high");
        assert!(json.get("element").is_none());
    }
}
