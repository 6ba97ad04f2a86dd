//! Semantic-quality estimation.
//!
//! The heuristic estimator is deterministic and always available. The
//! language-model estimator is used only when an API key is configured, and
//! degrades to the heuristic on any failure; the result's `source` records
//! which one actually produced it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::SemanticConfig;
use crate::domain::{AnalysisSource, AuditIssue, ContentAnalysis, SemanticAnalysis, Severity};
use crate::error::{AppError, Result};

pub const SEMANTIC_ISSUE_TYPE: &str = "semantic-quality";

const LLM_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are an expert semantic SEO analyst. Provide detailed, actionable \
analysis in valid JSON format only. Do not include any text outside the JSON structure.";

const ANALYSIS_PROMPT: &str = r#"Analyze the following website content for semantic SEO quality.

Content Preview: {content}
Target Keywords: {keywords}

Assess topic relevance, semantic keyword coverage, content depth, entity mentions and readability.

Return ONLY valid JSON in this exact structure:
{
  "semanticScore": number,
  "issues": [
    {"title": "string", "description": "string", "severity": "high|medium|low", "recommendation": "string"}
  ],
  "recommendations": ["string"],
  "contentAnalysis": {
    "topicRelevance": number,
    "semanticKeywords": ["string"],
    "contentDepth": number,
    "entityRecognition": ["string"],
    "readabilityScore": number
  }
}"#;

#[async_trait]
pub trait SemanticEstimator: Send + Sync {
    async fn estimate_semantic_quality(
        &self,
        content: &str,
        keywords: &[String],
    ) -> Result<SemanticAnalysis>;

    fn name(&self) -> &'static str;
}

/// Picks the language-model estimator when an API key is configured.
pub fn estimator_from_config(config: &SemanticConfig) -> Result<Arc<dyn SemanticEstimator>> {
    if config.api_key.is_some() {
        Ok(Arc::new(LlmSemanticEstimator::new(config.clone())?))
    } else {
        Ok(Arc::new(HeuristicSemanticEstimator))
    }
}

// ====== Heuristic ======

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSemanticEstimator;

impl HeuristicSemanticEstimator {
    pub fn estimate(&self, content: &str, keywords: &[String]) -> SemanticAnalysis {
        let chars = content.chars().count();
        let lowercase = content.to_lowercase();

        let occurrences: usize = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| lowercase.matches(k.as_str()).count())
            .sum();
        let density = if chars == 0 {
            0.0
        } else {
            occurrences as f64 / chars as f64 * 100.0
        };

        let length_bonus = if chars > 1000 { 10.0 } else { 0.0 };
        let semantic_score = (60.0 + density * 2.0 + length_bonus).clamp(40.0, 85.0);
        let content_depth = match chars {
            c if c > 2000 => 80,
            c if c > 1000 => 65,
            _ => 45,
        };
        let readability = if chars > 500 { 85 } else { 75 };

        SemanticAnalysis {
            source: AnalysisSource::Fallback,
            semantic_score: semantic_score.round() as u8,
            issues: vec![AuditIssue::new(
                SEMANTIC_ISSUE_TYPE,
                Severity::Medium,
                "Limited Semantic Analysis Available",
            )
            .with_recommendation(
                "Ensure content includes semantic variations of target keywords and related entities.",
            )],
            recommendations: vec![
                "Expand content with semantic keyword variations".to_string(),
                "Add related entities and concepts to improve topical authority".to_string(),
                "Implement structured data markup for better content understanding".to_string(),
                "Create content clusters around main topics".to_string(),
            ],
            content_analysis: ContentAnalysis {
                topic_relevance: (70.0 + density).min(90.0).round() as u8,
                semantic_keywords: keywords.iter().take(5).cloned().collect(),
                content_depth,
                entity_recognition: ["website", "content", "SEO", "analysis"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                readability_score: readability,
            },
        }
    }
}

#[async_trait]
impl SemanticEstimator for HeuristicSemanticEstimator {
    async fn estimate_semantic_quality(
        &self,
        content: &str,
        keywords: &[String],
    ) -> Result<SemanticAnalysis> {
        Ok(self.estimate(content, keywords))
    }

    fn name(&self) -> &'static str {
        "Heuristic"
    }
}

// ====== Language model ======

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LlmResponse {
    semantic_score: Option<f64>,
    issues: Vec<LlmIssue>,
    recommendations: Vec<String>,
    content_analysis: Option<LlmContentAnalysis>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmIssue {
    title: String,
    description: String,
    severity: Option<Severity>,
    recommendation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LlmContentAnalysis {
    topic_relevance: f64,
    semantic_keywords: Vec<String>,
    content_depth: f64,
    entity_recognition: Vec<String>,
    readability_score: f64,
}

pub struct LlmSemanticEstimator {
    client: Client,
    config: SemanticConfig,
    fallback: HeuristicSemanticEstimator,
}

impl LlmSemanticEstimator {
    pub fn new(config: SemanticConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .context("Failed to build semantic backend client")?;
        Ok(Self {
            client,
            config,
            fallback: HeuristicSemanticEstimator,
        })
    }

    fn prompt(&self, content: &str, keywords: &[String]) -> String {
        let mut preview: String = content.chars().take(self.config.max_content_chars).collect();
        if preview.len() < content.len() {
            preview.push_str("...");
        }
        ANALYSIS_PROMPT
            .replace("{content}", &preview)
            .replace("{keywords}", &keywords.join(", "))
    }

    async fn request(&self, content: &str, keywords: &[String]) -> Result<SemanticAnalysis> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::service("semantic", "API key not configured"))?;

        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": self.prompt(content, keywords)}
            ],
            "temperature": 0.3,
            "max_tokens": self.config.max_tokens,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::service("semantic", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::service(
                "semantic",
                format!("backend error {}: {}", status, error_text),
            ));
        }

        let envelope: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::service("semantic", format!("invalid response: {}", e)))?;

        let text = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AppError::service("semantic", "no content in response"))?;

        let parsed: LlmResponse = serde_json::from_str(text)
            .map_err(|e| AppError::service("semantic", format!("malformed analysis JSON: {}", e)))?;

        Ok(Self::into_analysis(parsed, keywords))
    }

    fn into_analysis(parsed: LlmResponse, keywords: &[String]) -> SemanticAnalysis {
        let issues = parsed
            .issues
            .into_iter()
            .map(|issue| {
                let description = match (issue.title.is_empty(), issue.description.is_empty()) {
                    (false, false) => format!("{}: {}", issue.title, issue.description),
                    (false, true) => issue.title,
                    _ => issue.description,
                };
                let mut audit_issue = AuditIssue::new(
                    SEMANTIC_ISSUE_TYPE,
                    issue.severity.unwrap_or(Severity::Medium),
                    description,
                );
                if let Some(recommendation) = issue.recommendation {
                    audit_issue = audit_issue.with_recommendation(recommendation);
                }
                audit_issue
            })
            .collect();

        let content_analysis = match parsed.content_analysis {
            Some(ca) => ContentAnalysis {
                topic_relevance: to_score(ca.topic_relevance),
                semantic_keywords: ca.semantic_keywords,
                content_depth: to_score(ca.content_depth),
                entity_recognition: ca.entity_recognition,
                readability_score: to_score(ca.readability_score),
            },
            None => ContentAnalysis {
                topic_relevance: 70,
                semantic_keywords: keywords.iter().take(5).cloned().collect(),
                content_depth: 60,
                entity_recognition: Vec::new(),
                readability_score: 75,
            },
        };

        SemanticAnalysis {
            source: AnalysisSource::Backend,
            semantic_score: to_score(parsed.semantic_score.unwrap_or(70.0)),
            issues,
            recommendations: parsed.recommendations,
            content_analysis,
        }
    }
}

#[async_trait]
impl SemanticEstimator for LlmSemanticEstimator {
    async fn estimate_semantic_quality(
        &self,
        content: &str,
        keywords: &[String],
    ) -> Result<SemanticAnalysis> {
        match self.request(content, keywords).await {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                tracing::warn!("Semantic backend failed, using heuristic estimate: {}", e);
                Ok(self.fallback.estimate(content, keywords))
            }
        }
    }

    fn name(&self) -> &'static str {
        "Language model"
    }
}

fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}
