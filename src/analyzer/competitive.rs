//! Competitive analyzer. Every figure here is an estimate derived from the
//! page itself; no competitor or backlink data is ever fetched.

use crate::domain::{
    BacklinkComparison, CompetitiveAnalysis, CompetitorStrength, ContentGap, DomainMetrics,
    KeywordOpportunity, Level, SerpEstimate,
};
use crate::extractor::PageSignals;

const KEYWORD_MODIFIERS: [&str; 9] = [
    "best", "top", "guide", "tutorial", "how to", "tips", "review", "compare", "vs",
];

const VIDEO_HOSTS: [&str; 3] = ["youtube", "vimeo", "wistia"];

const BACKLINK_RECOMMENDATIONS: [&str; 4] = [
    "Focus on earning backlinks from high-authority domains in your niche",
    "Create linkable assets like original research, tools, or comprehensive guides",
    "Engage in guest posting on relevant industry websites",
    "Monitor competitor backlink profiles and identify link opportunities",
];

const METRIC_BASE: u32 = 50;

/// Page measurements the estimates are computed from.
#[derive(Debug, Clone, Copy)]
struct Measurements {
    words: usize,
    headings: usize,
    images: usize,
    links: usize,
    internal_links: usize,
    schema_blocks: usize,
    has_video: bool,
    has_infographic: bool,
    has_faq: bool,
    has_canonical: bool,
    has_sitemap: bool,
}

impl Measurements {
    fn from_signals(signals: &PageSignals, lowercase_text: &str) -> Self {
        Self {
            words: signals.word_count,
            headings: signals.heading_count,
            images: signals.image_count,
            links: signals.link_count,
            internal_links: signals.internal_link_count,
            schema_blocks: signals.json_ld_blocks,
            has_video: signals.iframe_sources.iter().any(|src| {
                let src = src.to_ascii_lowercase();
                VIDEO_HOSTS.iter().any(|host| src.contains(host))
            }),
            has_infographic: lowercase_text.contains("infographic"),
            has_faq: signals.has_schema_type("FAQPage"),
            has_canonical: signals.has_canonical,
            has_sitemap: lowercase_text.contains("sitemap"),
        }
    }
}

pub struct CompetitiveAnalyzer;

impl CompetitiveAnalyzer {
    pub fn analyze(signals: &PageSignals) -> CompetitiveAnalysis {
        let lowercase = signals.lowercase_text();
        let m = Measurements::from_signals(signals, &lowercase);
        let domain = signals.domain();

        let domain_metrics = Self::domain_metrics(&m);
        let authority = domain_metrics.estimated_authority;

        let backlink_comparison = BacklinkComparison {
            estimated_backlinks: u32::from(authority) * 10,
            quality: match authority {
                70.. => Level::High,
                50.. => Level::Medium,
                _ => Level::Low,
            },
            recommendations: BACKLINK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        };

        let analysis = CompetitiveAnalysis {
            estimated: true,
            competitor_urls: Vec::new(),
            content_gaps: Self::content_gaps(&m),
            keyword_opportunities: Self::keyword_opportunities(signals, &lowercase, &domain),
            competitor_strengths: Self::strengths(&m),
            backlink_comparison,
            serp_positions: Self::serp_positions(&domain, &domain_metrics),
            domain_metrics,
        };

        tracing::debug!(
            "[COMPETITIVE] {} - gaps: {}, authority: {}, quality: {}, technical: {}",
            signals.url,
            analysis.content_gaps.len(),
            analysis.domain_metrics.estimated_authority,
            analysis.domain_metrics.content_quality,
            analysis.domain_metrics.technical_seo
        );

        analysis
    }

    fn content_gaps(m: &Measurements) -> Vec<ContentGap> {
        let mut gaps = Vec::new();

        if m.words < 1000 {
            gaps.push(gap(
                "Content Depth",
                Level::High,
                format!(
                    "Current content is {} words. Competitors typically have 1000-2000+ words",
                    m.words
                ),
                "Expand content with comprehensive information, examples, and detailed explanations",
            ));
        }
        if !m.has_video {
            gaps.push(gap(
                "Multimedia Content",
                Level::Medium,
                "No video content detected. Competitors often include video tutorials or explanations"
                    .to_string(),
                "Add video content to increase engagement and dwell time",
            ));
        }
        if !m.has_faq {
            gaps.push(gap(
                "FAQ Section",
                Level::Medium,
                "No FAQ section found. Many competitors use FAQs to target long-tail queries"
                    .to_string(),
                "Create comprehensive FAQ section with schema markup",
            ));
        }
        if m.schema_blocks < 2 {
            gaps.push(gap(
                "Structured Data",
                Level::High,
                format!(
                    "Only {} schema type(s) implemented. Competitors use multiple schema types",
                    m.schema_blocks
                ),
                "Implement additional schema types (Article, BreadcrumbList, Organization, FAQ)",
            ));
        }
        if m.images < 3 {
            gaps.push(gap(
                "Visual Content",
                Level::Medium,
                format!(
                    "Only {} image(s) found. Visual content improves engagement",
                    m.images
                ),
                "Add relevant images, diagrams, screenshots, or infographics",
            ));
        }
        if m.internal_links < 5 {
            gaps.push(gap(
                "Internal Linking",
                Level::Medium,
                format!(
                    "Only {} internal link(s). Strong competitors link related content heavily",
                    m.internal_links
                ),
                "Add contextual internal links to related content and important pages",
            ));
        }

        gaps
    }

    fn keyword_opportunities(
        signals: &PageSignals,
        lowercase_text: &str,
        domain: &str,
    ) -> Vec<KeywordOpportunity> {
        let title = signals.title.as_deref().unwrap_or_default().to_lowercase();
        let description = signals
            .meta_description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let mut opportunities: Vec<KeywordOpportunity> = KEYWORD_MODIFIERS
            .iter()
            .filter(|modifier| {
                !title.contains(*modifier)
                    && !description.contains(*modifier)
                    && !lowercase_text.contains(*modifier)
            })
            .map(|modifier| KeywordOpportunity {
                keyword: modifier.to_string(),
                search_volume: 1000,
                difficulty: 45,
                intent: "informational".to_string(),
                reason: "High-value modifier not currently targeted in content".to_string(),
            })
            .collect();

        opportunities.push(KeywordOpportunity {
            keyword: format!("{} alternative", domain),
            search_volume: 500,
            difficulty: 35,
            intent: "commercial".to_string(),
            reason: "Comparison keywords can capture competitor traffic".to_string(),
        });
        opportunities.push(KeywordOpportunity {
            keyword: format!("{} review", domain),
            search_volume: 800,
            difficulty: 40,
            intent: "commercial".to_string(),
            reason: "Review content attracts high-intent users".to_string(),
        });

        opportunities
    }

    fn strengths(m: &Measurements) -> Vec<CompetitorStrength> {
        let mut strengths = Vec::new();

        if m.words >= 800 {
            strengths.push(strength(
                "Content Volume",
                "Good content length that matches or exceeds typical competitor content",
                "Maintain content quality and update regularly with fresh information",
            ));
        }
        if m.schema_blocks > 0 {
            strengths.push(strength(
                "Structured Data",
                "Implementing structured data for better search visibility",
                "Continue expanding schema markup to more content types",
            ));
        }
        if m.links >= 10 {
            strengths.push(strength(
                "Link Strategy",
                "Good number of links providing additional resources",
                "Focus on acquiring more authoritative external backlinks",
            ));
        }
        if m.headings >= 5 {
            strengths.push(strength(
                "Content Structure",
                "Well-structured content with proper heading hierarchy",
                "Ensure headings target relevant keywords and user questions",
            ));
        }
        if m.has_infographic {
            strengths.push(strength(
                "Visual Assets",
                "Infographic content that attracts shares and links",
                "Promote infographics to earn embeds and backlinks",
            ));
        }

        strengths
    }

    fn domain_metrics(m: &Measurements) -> DomainMetrics {
        let mut authority = METRIC_BASE;
        if m.words >= 1000 {
            authority += 10;
        }
        if m.schema_blocks >= 2 {
            authority += 10;
        }
        if m.internal_links >= 5 {
            authority += 10;
        }
        if m.has_video {
            authority += 5;
        }

        let mut quality = METRIC_BASE;
        if m.words >= 800 {
            quality += 15;
        }
        if m.headings >= 5 {
            quality += 10;
        }
        if m.images >= 3 {
            quality += 10;
        }
        if m.has_video {
            quality += 10;
        }
        if m.has_faq {
            quality += 5;
        }

        let mut technical = METRIC_BASE;
        if m.schema_blocks >= 1 {
            technical += 15;
        }
        if m.internal_links >= 5 {
            technical += 15;
        }
        if m.has_canonical {
            technical += 10;
        }
        if m.has_sitemap {
            technical += 10;
        }

        DomainMetrics {
            estimated_authority: cap(authority),
            content_quality: cap(quality),
            technical_seo: cap(technical),
        }
    }

    fn serp_positions(domain: &str, metrics: &DomainMetrics) -> Vec<SerpEstimate> {
        let strong_content = metrics.content_quality >= 70;
        let brand = brand_label(domain);

        vec![
            SerpEstimate {
                keyword: domain.to_string(),
                estimated_position: 1,
                opportunity: "Maintain brand keyword dominance".to_string(),
            },
            SerpEstimate {
                keyword: format!("{} review", domain),
                estimated_position: if strong_content { 5 } else { 15 },
                opportunity: if strong_content {
                    "Strengthen position with more reviews and testimonials"
                } else {
                    "Create comprehensive review content to improve ranking"
                }
                .to_string(),
            },
            SerpEstimate {
                keyword: format!("best {}", brand),
                estimated_position: if metrics.estimated_authority >= 70 { 8 } else { 20 },
                opportunity: "Target comparison keywords to capture more traffic".to_string(),
            },
        ]
    }
}

fn gap(topic: &str, priority: Level, description: String, opportunity: &str) -> ContentGap {
    ContentGap {
        topic: topic.to_string(),
        priority,
        description,
        opportunity: opportunity.to_string(),
    }
}

fn strength(area: &str, description: &str, action_item: &str) -> CompetitorStrength {
    CompetitorStrength {
        area: area.to_string(),
        description: description.to_string(),
        action_item: action_item.to_string(),
    }
}

fn cap(value: u32) -> u8 {
    value.min(100) as u8
}

/// `www.shop.example.com` -> `shop`.
fn brand_label(domain: &str) -> &str {
    let host = domain.strip_prefix("www.").unwrap_or(domain);
    host.split('.').next().unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::words;
    use url::Url;

    fn run(html: &str) -> CompetitiveAnalysis {
        let url = Url::parse("https://www.example.com/post").unwrap();
        CompetitiveAnalyzer::analyze(&PageSignals::from_html(html, &url))
    }

    #[test]
    fn test_thin_page_has_six_gaps() {
        let html = format!(
            r#"<html><head><script type="application/ld+json">{{"@type":"Article"}}</script></head>
            <body><p>{}</p><img src="a.png" alt="a"><a href="/one">1</a><a href="/two">2</a></body></html>"#,
            words(198)
        );
        let analysis = run(&html);
        let topics: Vec<_> = analysis.content_gaps.iter().map(|g| g.topic.as_str()).collect();
        assert_eq!(
            topics,
            vec![
                "Content Depth",
                "Multimedia Content",
                "FAQ Section",
                "Structured Data",
                "Visual Content",
                "Internal Linking"
            ]
        );
        assert!(analysis.content_gaps[0].description.contains("200 words"));
        assert!(analysis.estimated);
        assert!(analysis.competitor_urls.is_empty());
    }

    #[test]
    fn test_domain_metrics_and_backlinks() {
        let html = format!(
            r#"<html><head>
            <link rel="canonical" href="https://www.example.com/post">
            <script type="application/ld+json">{{"@type":"Article"}}</script>
            <script type="application/ld+json">{{"@type":"FAQPage"}}</script></head>
            <body><h1>a</h1><h2>b</h2><h2>c</h2><h3>d</h3><h3>e</h3>
            <iframe src="https://www.youtube.com/embed/xyz"></iframe>
            <img src="1.png" alt=""><img src="2.png" alt=""><img src="3.png" alt="">
            <p>{} See our sitemap.</p>
            <a href="/1">1</a><a href="/2">2</a><a href="/3">3</a><a href="/4">4</a><a href="/5">5</a>
            </body></html>"#,
            words(1200)
        );
        let analysis = run(&html);
        let metrics = &analysis.domain_metrics;
        assert_eq!(metrics.estimated_authority, 85);
        assert_eq!(metrics.content_quality, 100);
        assert_eq!(metrics.technical_seo, 100);
        assert_eq!(analysis.backlink_comparison.estimated_backlinks, 850);
        assert_eq!(analysis.backlink_comparison.quality, Level::High);
        assert_eq!(analysis.backlink_comparison.recommendations.len(), 4);
        assert!(analysis.content_gaps.is_empty());
    }

    #[test]
    fn test_keyword_opportunities_skip_present_modifiers() {
        let analysis = run("<html><head><title>The best guide</title></head><body><p>Some tips.</p></body></html>");
        let keywords: Vec<_> = analysis
            .keyword_opportunities
            .iter()
            .map(|k| k.keyword.as_str())
            .collect();
        assert_eq!(
            keywords,
            vec![
                "top",
                "tutorial",
                "how to",
                "review",
                "compare",
                "vs",
                "www.example.com alternative",
                "www.example.com review"
            ]
        );
    }

    #[test]
    fn test_serp_positions_use_domain_and_brand() {
        let analysis = run("<html><body><p>Hello</p></body></html>");
        let serp = &analysis.serp_positions;
        assert_eq!(serp[0].keyword, "www.example.com");
        assert_eq!(serp[0].estimated_position, 1);
        assert_eq!(serp[1].estimated_position, 15);
        assert_eq!(serp[2].keyword, "best example");
        assert_eq!(serp[2].estimated_position, 20);
    }

    #[test]
    fn test_brand_label() {
        assert_eq!(brand_label("www.shop.example.com"), "shop");
        assert_eq!(brand_label("example.org"), "example");
        assert_eq!(brand_label("localhost"), "localhost");
    }
}
