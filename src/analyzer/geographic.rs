//! Geographic analyzer - hreflang validation and local-SEO signals.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::domain::{clamp_score, AuditIssue, GeographicAnalysis, HreflangTag, Severity};
use crate::extractor::PageSignals;

const X_DEFAULT: &str = "x-default";

const INVALID_FORMAT: &str =
    r#"Invalid hreflang format. Should be ISO 639-1 language code (e.g., "en", "es-MX")"#;
const INVALID_HREF: &str = "Invalid URL format";

// local_seo_score penalties
const PENALTY_MISSING_HREFLANG: i32 = 20;
const PENALTY_MISSING_LOCAL_SCHEMA: i32 = 15;
const PENALTY_MISSING_MAP: i32 = 10;
const PENALTY_MISSING_OG_LOCALE: i32 = 5;

fn hreflang_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("static regex"))
}

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b\d{1,5}\s+[\w\s]{1,50}(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|place|pl)\b",
        )
        .expect("static regex")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:\+?1[-.]?)?\(?([0-9]{3})\)?[-.]?([0-9]{3})[-.]?([0-9]{4})\b")
            .expect("static regex")
    })
}

fn map_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)maps\.google\.|google\.com/maps|openstreetmap\.org").expect("static regex")
    })
}

pub struct GeographicAnalyzer;

impl GeographicAnalyzer {
    pub fn analyze(signals: &PageSignals) -> GeographicAnalysis {
        let mut issues = Vec::new();
        let mut languages = BTreeSet::new();
        let mut regions = BTreeSet::new();

        let hreflang_tags = Self::build_tags(signals, &mut languages, &mut regions);

        if hreflang_tags.is_empty() {
            for lang in signals.html_lang.iter().chain(signals.lang_attributes.iter()) {
                if let Some(primary) = lang.split('-').next().filter(|p| !p.is_empty()) {
                    languages.insert(primary.to_lowercase());
                }
            }
        } else {
            issues.extend(Self::check_tags(&hreflang_tags));
        }

        let has_local_schema =
            signals.has_schema_type("LocalBusiness") || signals.has_schema_type("Organization");
        let has_address = address_pattern().is_match(&signals.text);
        let has_phone = phone_pattern().is_match(&signals.text);
        let has_local_signals = has_address || has_phone;
        let has_map = map_pattern().is_match(&signals.raw_html);

        let mut score: i32 = 100;

        if languages.len() > 1 && hreflang_tags.is_empty() {
            issues.push(
                AuditIssue::new(
                    "missing-hreflang",
                    Severity::High,
                    format!(
                        "Multi-language content detected ({}) without hreflang tags",
                        languages.iter().cloned().collect::<Vec<_>>().join(", ")
                    ),
                )
                .with_recommendation(
                    "Add hreflang tags to help search engines serve the correct language version",
                ),
            );
            score -= PENALTY_MISSING_HREFLANG;
        }

        if has_local_signals && !has_local_schema {
            issues.push(
                AuditIssue::new(
                    "missing-local-schema",
                    Severity::Medium,
                    "Local business information found but missing structured data",
                )
                .with_recommendation(
                    "Add LocalBusiness or Organization schema markup for better local SEO",
                ),
            );
            score -= PENALTY_MISSING_LOCAL_SCHEMA;
        }

        if has_local_signals && !has_map {
            issues.push(
                AuditIssue::new(
                    "missing-map-embed",
                    Severity::Low,
                    "Local business detected without embedded map",
                )
                .with_recommendation(
                    "Consider embedding a map to improve local user experience",
                ),
            );
            score -= PENALTY_MISSING_MAP;
        }

        if signals.og_locale.is_none() && !languages.is_empty() {
            issues.push(
                AuditIssue::new(
                    "missing-og-locale",
                    Severity::Low,
                    "Missing og:locale meta tag for social sharing",
                )
                .with_recommendation(
                    "Add og:locale meta tag to specify language for social media platforms",
                ),
            );
            score -= PENALTY_MISSING_OG_LOCALE;
        }

        let recommendations = Self::recommendations(
            &issues,
            &hreflang_tags,
            &languages,
            has_local_signals && !signals.has_schema_type("LocalBusiness"),
        );

        tracing::debug!(
            "[GEO] {} - hreflang: {}, languages: {}, local score: {}",
            signals.url,
            hreflang_tags.len(),
            languages.len(),
            clamp_score(score)
        );

        GeographicAnalysis {
            hreflang_tags,
            local_seo_score: clamp_score(score),
            languages_detected: languages,
            regions_detected: regions,
            issues,
            recommendations,
        }
    }

    fn build_tags(
        signals: &PageSignals,
        languages: &mut BTreeSet<String>,
        regions: &mut BTreeSet<String>,
    ) -> Vec<HreflangTag> {
        signals
            .hreflang_links
            .iter()
            .map(|link| {
                let code = link.value.as_str();
                let is_x_default = code == X_DEFAULT;
                let mut parts = code.split('-');
                let lang = parts.next().unwrap_or_default();
                let region = parts.next().map(str::to_string);

                if !is_x_default {
                    if !lang.is_empty() {
                        languages.insert(lang.to_string());
                    }
                    if let Some(r) = &region {
                        regions.insert(r.clone());
                    }
                }

                let is_valid = is_x_default || hreflang_pattern().is_match(code);
                let mut tag_issues = Vec::new();
                if !is_valid {
                    tag_issues.push(INVALID_FORMAT.to_string());
                }
                if Url::parse(&link.href).is_err() {
                    tag_issues.push(INVALID_HREF.to_string());
                }

                HreflangTag {
                    lang: code.to_string(),
                    region: if is_x_default { None } else { region },
                    href: link.href.clone(),
                    is_valid,
                    issues: (!tag_issues.is_empty()).then_some(tag_issues),
                }
            })
            .collect()
    }

    fn check_tags(tags: &[HreflangTag]) -> Vec<AuditIssue> {
        let mut issues = Vec::new();

        let has_x_default = tags.iter().any(|t| t.lang == X_DEFAULT);
        if !has_x_default && tags.len() > 1 {
            issues.push(
                AuditIssue::new(
                    "missing-x-default",
                    Severity::Medium,
                    "Missing x-default hreflang tag for international targeting",
                )
                .with_recommendation(
                    "Add an x-default hreflang tag to specify the default page for unmatched languages",
                ),
            );
        }

        let invalid: Vec<&str> = tags
            .iter()
            .filter(|t| !t.is_valid)
            .map(|t| t.lang.as_str())
            .collect();
        if !invalid.is_empty() {
            issues.push(
                AuditIssue::new(
                    "invalid-hreflang",
                    Severity::High,
                    format!("Found {} invalid hreflang tag(s)", invalid.len()),
                )
                .with_element(invalid.join(", "))
                .with_recommendation("Fix hreflang tags to use proper ISO 639-1 language codes"),
            );
        }

        // first-seen order
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for tag in tags {
            let count = counts.entry(tag.lang.as_str()).or_insert(0);
            if *count == 0 {
                order.push(tag.lang.as_str());
            }
            *count += 1;
        }
        let duplicates: Vec<&str> = order.into_iter().filter(|l| counts[l] > 1).collect();
        if !duplicates.is_empty() {
            issues.push(
                AuditIssue::new(
                    "duplicate-hreflang",
                    Severity::High,
                    format!("Found duplicate hreflang tags: {}", duplicates.join(", ")),
                )
                .with_element(duplicates.join(", "))
                .with_recommendation(
                    "Remove duplicate hreflang tags - each language/region should appear only once",
                ),
            );
        }

        issues
    }

    fn recommendations(
        issues: &[AuditIssue],
        tags: &[HreflangTag],
        languages: &BTreeSet<String>,
        lacks_local_business: bool,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if issues.is_empty() {
            recommendations.push("Good geographic targeting setup".to_string());
            if !tags.is_empty() {
                recommendations.push(format!(
                    "Successfully implementing hreflang for {} language(s)",
                    languages.len()
                ));
            }
            return recommendations;
        }

        if tags.is_empty() && languages.len() <= 1 {
            recommendations
                .push("If targeting multiple countries/languages, implement hreflang tags".to_string());
        }
        if lacks_local_business {
            recommendations
                .push("Add LocalBusiness schema markup to improve local search visibility".to_string());
        }
        if languages.len() > 1 {
            recommendations
                .push("Ensure each language version has proper hreflang implementation".to_string());
        }
        if recommendations.is_empty() {
            recommendations.push("Resolve the hreflang issues listed above".to_string());
        }

        recommendations
    }
}
