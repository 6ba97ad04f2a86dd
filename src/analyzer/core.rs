//! Core heuristic analyzer - on-page and technical checks with weighted scoring.
//!
//! Each check contributes at most one issue. Image alt text is aggregated into
//! a single issue carrying the count.

use crate::domain::{AuditIssue, AuditMetadata, AuditResult, Severity};
use crate::extractor::PageSignals;

const TITLE_MIN_CHARS: usize = 30;
const TITLE_MAX_CHARS: usize = 60;
const DESCRIPTION_MIN_CHARS: usize = 120;
const DESCRIPTION_MAX_CHARS: usize = 160;
const MIN_OG_PROPERTIES: usize = 3;
const MIN_INTERNAL_LINKS: usize = 3;
const THIN_CONTENT_WORDS: usize = 300;

const POSITIVE_RECOMMENDATIONS: [&str; 3] = [
    "Great job! Your page has good SEO fundamentals",
    "Continue monitoring and improving your content regularly",
    "Consider adding more internal links and updating content",
];

pub struct CoreAnalyzer;

impl CoreAnalyzer {
    pub fn analyze(signals: &PageSignals, metadata: AuditMetadata) -> AuditResult {
        let checks = [
            Self::check_title(signals),
            Self::check_meta_description(signals),
            Self::check_h1(signals),
            Self::check_viewport(signals),
            Self::check_canonical(signals),
            Self::check_open_graph(signals),
            Self::check_image_alt(signals),
            Self::check_h2(signals),
            Self::check_internal_links(signals),
            Self::check_structured_data(signals),
            Self::check_robots(signals),
            Self::check_thin_content(signals),
        ];

        let issues: Vec<AuditIssue> = checks.into_iter().flatten().collect();
        let recommendations = Self::recommendations(&issues);
        let result = AuditResult::new(issues, recommendations, metadata);

        tracing::debug!(
            "[CORE] {} - score: {}, issues: {}",
            result.metadata.url,
            result.score(),
            result.issues().len()
        );

        result
    }

    fn check_title(signals: &PageSignals) -> Option<AuditIssue> {
        let title = match signals.title.as_deref() {
            None => {
                return Some(
                    AuditIssue::new("missing-title", Severity::High, "Page is missing a title tag")
                        .with_recommendation("Add a descriptive title tag (50-60 characters)"),
                )
            }
            Some(t) => t,
        };

        let len = title.chars().count();
        if len == 0 {
            Some(
                AuditIssue::new("empty-title", Severity::High, "Title tag is empty")
                    .with_element(title)
                    .with_recommendation("Add descriptive text to your title tag"),
            )
        } else if len < TITLE_MIN_CHARS {
            Some(
                AuditIssue::new(
                    "short-title",
                    Severity::Medium,
                    format!("Title tag is too short ({} chars, less than {})", len, TITLE_MIN_CHARS),
                )
                .with_element(title)
                .with_recommendation("Expand your title to 50-60 characters for better SEO"),
            )
        } else if len > TITLE_MAX_CHARS {
            Some(
                AuditIssue::new(
                    "long-title",
                    Severity::Low,
                    format!("Title tag is too long ({} chars, more than {})", len, TITLE_MAX_CHARS),
                )
                .with_element(title)
                .with_recommendation("Shorten your title to 50-60 characters to avoid truncation"),
            )
        } else {
            None
        }
    }

    fn check_meta_description(signals: &PageSignals) -> Option<AuditIssue> {
        let Some(description) = signals.meta_description.as_deref() else {
            return Some(
                AuditIssue::new(
                    "missing-meta-description",
                    Severity::High,
                    "Page is missing a meta description",
                )
                .with_recommendation("Add a meta description (150-160 characters)"),
            );
        };

        let len = description.chars().count();
        if len < DESCRIPTION_MIN_CHARS {
            Some(
                AuditIssue::new(
                    "short-meta-description",
                    Severity::Medium,
                    format!("Meta description is too short ({} chars)", len),
                )
                .with_element(excerpt(description, 50))
                .with_recommendation("Expand to 150-160 characters for optimal display"),
            )
        } else if len > DESCRIPTION_MAX_CHARS {
            Some(
                AuditIssue::new(
                    "long-meta-description",
                    Severity::Low,
                    format!("Meta description is too long ({} chars)", len),
                )
                .with_element(excerpt(description, 50))
                .with_recommendation("Shorten to 150-160 characters to prevent truncation"),
            )
        } else {
            None
        }
    }

    fn check_h1(signals: &PageSignals) -> Option<AuditIssue> {
        match signals.h1_count {
            0 => Some(
                AuditIssue::new("missing-h1", Severity::High, "Page is missing an H1 heading")
                    .with_recommendation("Add a single, descriptive H1 heading"),
            ),
            1 => None,
            n => Some(
                AuditIssue::new(
                    "multiple-h1",
                    Severity::Medium,
                    format!("Found {} H1 tags (should only have one)", n),
                )
                .with_recommendation("Use only one H1 tag per page"),
            ),
        }
    }

    fn check_viewport(signals: &PageSignals) -> Option<AuditIssue> {
        (!signals.has_viewport).then(|| {
            AuditIssue::new(
                "missing-viewport",
                Severity::Medium,
                "Missing viewport meta tag for mobile responsiveness",
            )
            .with_recommendation("Add viewport meta tag for mobile optimization")
        })
    }

    fn check_canonical(signals: &PageSignals) -> Option<AuditIssue> {
        (!signals.has_canonical).then(|| {
            AuditIssue::new("missing-canonical", Severity::Low, "Missing canonical URL")
                .with_recommendation("Add canonical link to prevent duplicate content issues")
        })
    }

    fn check_open_graph(signals: &PageSignals) -> Option<AuditIssue> {
        (signals.og_property_count < MIN_OG_PROPERTIES).then(|| {
            AuditIssue::new(
                "missing-og-tags",
                Severity::Low,
                format!(
                    "Missing or incomplete Open Graph tags ({} found)",
                    signals.og_property_count
                ),
            )
            .with_recommendation("Add Open Graph tags for better social media sharing")
        })
    }

    fn check_image_alt(signals: &PageSignals) -> Option<AuditIssue> {
        (signals.images_without_alt > 0).then(|| {
            AuditIssue::new(
                "missing-image-alt",
                Severity::Medium,
                format!(
                    "Found {} of {} images without alt attributes",
                    signals.images_without_alt, signals.image_count
                ),
            )
            .with_element("img")
            .with_recommendation("Add descriptive alt text to all images")
        })
    }

    fn check_h2(signals: &PageSignals) -> Option<AuditIssue> {
        (signals.h2_count == 0).then(|| {
            AuditIssue::new("no-h2-headings", Severity::Low, "No H2 headings found")
                .with_recommendation("Add H2 headings to structure your content")
        })
    }

    fn check_internal_links(signals: &PageSignals) -> Option<AuditIssue> {
        (signals.internal_link_count < MIN_INTERNAL_LINKS).then(|| {
            AuditIssue::new(
                "few-internal-links",
                Severity::Low,
                format!("Very few internal links found ({})", signals.internal_link_count),
            )
            .with_recommendation("Add more internal links to improve site navigation and SEO")
        })
    }

    fn check_structured_data(signals: &PageSignals) -> Option<AuditIssue> {
        (signals.json_ld_blocks == 0 && !signals.has_microdata).then(|| {
            AuditIssue::new(
                "missing-structured-data",
                Severity::Low,
                "No structured data (Schema.org) found",
            )
            .with_recommendation("Add JSON-LD structured data for rich snippets")
        })
    }

    fn check_robots(signals: &PageSignals) -> Option<AuditIssue> {
        let robots = signals.robots.as_deref()?;
        (robots.contains("noindex") || robots.contains("nofollow")).then(|| {
            AuditIssue::new(
                "robots-restriction",
                Severity::High,
                "Page has robots restriction (noindex/nofollow)",
            )
            .with_element(robots)
            .with_recommendation("Remove noindex/nofollow unless intentional")
        })
    }

    fn check_thin_content(signals: &PageSignals) -> Option<AuditIssue> {
        (signals.word_count < THIN_CONTENT_WORDS).then(|| {
            AuditIssue::new(
                "thin-content",
                Severity::Medium,
                format!("Low word count ({} words)", signals.word_count),
            )
            .with_recommendation("Aim for at least 300-500 words of quality content")
        })
    }

    /// One suggestion per issue type, in issue order. Never empty.
    fn recommendations(issues: &[AuditIssue]) -> Vec<String> {
        let mut recommendations: Vec<String> = Vec::new();
        for issue in issues {
            let text = recommendation_for(&issue.kind).to_string();
            if !recommendations.contains(&text) {
                recommendations.push(text);
            }
        }

        if recommendations.is_empty() {
            recommendations.extend(POSITIVE_RECOMMENDATIONS.iter().map(|s| s.to_string()));
        }
        recommendations
    }
}

fn recommendation_for(kind: &str) -> &'static str {
    match kind {
        "missing-title" | "empty-title" => "Add a compelling, keyword-rich title tag",
        "short-title" | "long-title" => "Keep your title between 50 and 60 characters",
        "missing-meta-description" => {
            "Add a compelling meta description to improve click-through rates"
        }
        "short-meta-description" | "long-meta-description" => {
            "Keep your meta description between 150 and 160 characters"
        }
        "missing-h1" => "Add a clear H1 heading that describes the page content",
        "multiple-h1" => "Consolidate to a single H1 heading per page",
        "missing-viewport" => {
            "Add viewport meta tag: <meta name='viewport' content='width=device-width, initial-scale=1'>"
        }
        "missing-canonical" => "Declare a canonical URL to consolidate duplicate content",
        "missing-og-tags" => "Add og:title, og:description and og:image for social sharing",
        "missing-image-alt" => "Add alt attributes to all images for accessibility and SEO",
        "no-h2-headings" => "Break content into sections with H2 headings",
        "few-internal-links" => "Link to related pages on your site to strengthen navigation",
        "missing-structured-data" => "Add Schema.org structured data to qualify for rich results",
        "robots-restriction" => "Review robots meta directives so the page can be indexed",
        "thin-content" => "Expand your content to provide more value to users",
        _ => "Review and address the reported issue",
    }
}

/// First `max_chars` characters followed by an ellipsis.
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
