use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{
    clamp_score, AuditIssue, Level, LongTailOpportunity, QuestionKind, QuestionPattern, Severity,
    VoiceSearchAnalysis,
};
use crate::extractor::PageSignals;

const CONVERSATIONAL_INDICATORS: [&str; 11] = [
    "best", "top", "find", "near me", "compare", "vs", "versus", "review", "guide", "tutorial",
    "tips",
];

const MAX_EXAMPLES: usize = 3;
const MAX_EXAMPLE_CHARS: usize = 100;
const CONCISE_ANSWER_CHARS: std::ops::RangeInclusive<usize> = 40..=300;

fn indicator_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CONVERSATIONAL_INDICATORS
            .iter()
            .map(|&word| {
                let pattern = format!(r"\b{}\b", regex::escape(word));
                (word, Regex::new(&pattern).expect("static regex"))
            })
            .collect()
    })
}

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\blocation\b").expect("static regex"))
}

/// The whole first token, lowercased. Contractions and hyphenated words are
/// not question words.
fn leading_word(token: &str) -> Option<String> {
    let token = token.trim_end_matches(['?', ',', ':', ';']);
    if token.is_empty() || token.contains(['\'', '\u{2019}', '-']) {
        return None;
    }
    Some(token.to_lowercase())
}

#[derive(Default)]
struct Bucket {
    count: usize,
    examples: Vec<String>,
}

pub struct VoiceSearchAnalyzer;

impl VoiceSearchAnalyzer {
    pub fn analyze(signals: &PageSignals) -> VoiceSearchAnalysis {
        let question_patterns = Self::question_patterns(&signals.text);
        let lowercase = signals.lowercase_text();
        let conversational_keywords: Vec<String> = indicator_patterns()
            .iter()
            .filter(|(_, pattern)| pattern.is_match(&lowercase))
            .map(|(word, _)| word.to_string())
            .collect();

        let has_faq = signals.has_schema_type("FAQPage");
        let has_howto = signals.has_schema_type("HowTo");
        let has_qa = signals.has_schema_type("QAPage");
        let has_lists = signals.has_lists;
        let pattern_kinds = question_patterns.len();

        let mut snippet = 0;
        if has_faq || has_howto || has_qa {
            snippet += 30;
        }
        if has_lists {
            snippet += 20;
        }
        if signals.has_tables {
            snippet += 15;
        }
        if pattern_kinds >= 3 {
            snippet += 20;
        }
        if signals.heading_count >= 5 {
            snippet += 15;
        }

        let mut readiness = 0;
        if pattern_kinds > 0 {
            readiness += 25;
        }
        if conversational_keywords.len() >= 3 {
            readiness += 20;
        }
        if has_faq {
            readiness += 20;
        }
        if has_howto {
            readiness += 20;
        }
        if has_lists {
            readiness += 15;
        }

        let has_how = question_patterns.iter().any(|p| p.kind == QuestionKind::How);
        let has_concise_answer = signals
            .paragraphs
            .iter()
            .any(|p| CONCISE_ANSWER_CHARS.contains(&p.chars().count()));

        let mut issues = Vec::new();

        if pattern_kinds == 0 {
            issues.push(
                AuditIssue::new(
                    "no-question-patterns",
                    Severity::High,
                    "No question-based content detected for voice search",
                )
                .with_recommendation(
                    "Add FAQ section or question-based headings (Who, What, When, Where, Why, How)",
                ),
            );
        }
        if !has_faq && pattern_kinds >= 3 {
            issues.push(
                AuditIssue::new(
                    "missing-faq-schema",
                    Severity::Medium,
                    "Question-based content found without FAQ schema",
                )
                .with_recommendation("Add FAQPage schema markup to improve voice search visibility"),
            );
        }
        if !has_howto && has_how {
            issues.push(
                AuditIssue::new(
                    "missing-howto-schema",
                    Severity::Medium,
                    "How-to content detected without HowTo schema",
                )
                .with_recommendation("Add HowTo schema markup for step-by-step instructions"),
            );
        }
        if conversational_keywords.len() < 3 {
            issues.push(
                AuditIssue::new(
                    "low-conversational-tone",
                    Severity::Medium,
                    "Limited conversational keywords found",
                )
                .with_recommendation(
                    "Use more natural, conversational language that matches voice search queries",
                ),
            );
        }
        if !has_lists && pattern_kinds > 0 {
            issues.push(
                AuditIssue::new(
                    "missing-structured-lists",
                    Severity::Low,
                    "Question content without structured lists",
                )
                .with_recommendation("Use ordered or unordered lists to present step-by-step answers"),
            );
        }
        if !has_concise_answer && pattern_kinds > 0 {
            issues.push(
                AuditIssue::new(
                    "no-concise-answers",
                    Severity::Medium,
                    "No concise answer paragraphs (40-300 characters) for featured snippets",
                )
                .with_recommendation(
                    "Provide direct, concise answers to questions in 40-300 character paragraphs",
                ),
            );
        }

        let long_tail_opportunities = Self::long_tail_opportunities(
            &signals.domain(),
            &question_patterns,
            &conversational_keywords,
            location_pattern().is_match(&lowercase),
        );

        let recommendations = if issues.is_empty() {
            vec!["Good voice search optimization setup".to_string()]
        } else {
            vec![
                "Add FAQ or Q&A sections to target voice search queries".to_string(),
                "Implement structured data (FAQ, HowTo, QAPage) for better visibility".to_string(),
                "Use natural, conversational language throughout content".to_string(),
                "Provide direct, concise answers in 40-300 character paragraphs".to_string(),
            ]
        };

        tracing::debug!(
            "[VOICE] {} - patterns: {}, keywords: {}, snippet: {}, readiness: {}",
            signals.url,
            pattern_kinds,
            conversational_keywords.len(),
            snippet,
            readiness
        );

        VoiceSearchAnalysis {
            question_patterns,
            featured_snippet_score: clamp_score(snippet),
            answer_readiness_score: clamp_score(readiness),
            conversational_keywords,
            long_tail_opportunities,
            issues,
            recommendations,
        }
    }

    /// Buckets sentences by their leading interrogative, in fixed who..how order.
    fn question_patterns(text: &str) -> Vec<QuestionPattern> {
        let mut buckets: [Bucket; 6] = Default::default();

        for sentence in text.split(['.', '!', '?']) {
            let sentence = sentence.trim();
            let Some(word) = sentence.split_whitespace().next().and_then(leading_word) else {
                continue;
            };
            let Some(kind) = QuestionKind::from_leading_word(&word) else {
                continue;
            };

            let bucket = &mut buckets[kind as usize];
            bucket.count += 1;
            if bucket.examples.len() < MAX_EXAMPLES {
                bucket.examples.push(sentence.chars().take(MAX_EXAMPLE_CHARS).collect());
            }
        }

        QuestionKind::ALL
            .iter()
            .zip(buckets)
            .filter(|(_, bucket)| bucket.count > 0)
            .map(|(kind, bucket)| QuestionPattern {
                kind: *kind,
                count: bucket.count,
                examples: bucket.examples,
            })
            .collect()
    }

    fn long_tail_opportunities(
        domain: &str,
        patterns: &[QuestionPattern],
        keywords: &[String],
        mentions_location: bool,
    ) -> Vec<LongTailOpportunity> {
        let mut opportunities: Vec<LongTailOpportunity> = patterns
            .iter()
            .map(|pattern| LongTailOpportunity {
                keyword: format!("{} {}", pattern.kind.as_str(), domain),
                intent: "informational".to_string(),
                difficulty: Level::Low,
                opportunity: format!(
                    "Create content targeting \"{}\" questions with {} existing patterns",
                    pattern.kind.as_str(),
                    pattern.count
                ),
            })
            .collect();

        let has_keyword = |k: &str| keywords.iter().any(|kw| kw == k);

        if has_keyword("near me") || mentions_location {
            opportunities.push(LongTailOpportunity {
                keyword: "near me queries".to_string(),
                intent: "local".to_string(),
                difficulty: Level::Medium,
                opportunity: "Optimize for local voice search queries with location-based content"
                    .to_string(),
            });
        }
        if has_keyword("best") || has_keyword("top") {
            opportunities.push(LongTailOpportunity {
                keyword: "comparison queries".to_string(),
                intent: "commercial".to_string(),
                difficulty: Level::Medium,
                opportunity: "Create comparison content for \"best\" and \"top\" voice searches"
                    .to_string(),
            });
        }

        opportunities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn run(html: &str) -> VoiceSearchAnalysis {
        let url = Url::parse("https://example.com/faq").unwrap();
        VoiceSearchAnalyzer::analyze(&PageSignals::from_html(html, &url))
    }

    fn kinds(analysis: &VoiceSearchAnalysis) -> Vec<QuestionKind> {
        analysis.question_patterns.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_question_classification() {
        let analysis = run("<p>How do I reset my password? What is two-factor login? Thanks.</p>");
        assert_eq!(kinds(&analysis), vec![QuestionKind::What, QuestionKind::How]);
        assert_eq!(analysis.question_patterns[1].examples, vec!["How do I reset my password"]);
    }

    #[test]
    fn test_auxiliaries_collapse_into_what() {
        let analysis = run("<p>Can I cancel anytime? Is shipping free? Which plan fits me?</p>");
        assert_eq!(kinds(&analysis), vec![QuestionKind::What]);
        assert_eq!(analysis.question_patterns[0].count, 3);
        assert_eq!(analysis.question_patterns[0].examples.len(), 3);
    }

    #[test]
    fn test_contractions_and_hyphenated_words_are_not_questions() {
        let analysis = run("<p>Can't stop the music. How-to guides are popular here.</p>");
        assert!(analysis.question_patterns.is_empty());
        assert!(!analysis.issues.iter().any(|i| i.kind == "missing-howto-schema"));
        assert_eq!(analysis.issues[0].kind, "no-question-patterns");
    }

    #[test]
    fn test_leading_word_keeps_whole_token() {
        assert_eq!(leading_word("How,").as_deref(), Some("how"));
        assert_eq!(leading_word("Whatever"), Some("whatever".to_string()));
        assert_eq!(leading_word("Can't"), None);
        assert_eq!(leading_word("How-to"), None);
        assert_eq!(leading_word("?"), None);
    }

    #[test]
    fn test_trailing_fragment_counts() {
        let analysis = run("<p>Intro text. Why choose us</p>");
        assert_eq!(kinds(&analysis), vec![QuestionKind::Why]);
    }

    #[test]
    fn test_examples_are_truncated() {
        let long = format!("What {}?", "x".repeat(200));
        let analysis = run(&format!("<p>{}</p>", long));
        assert_eq!(analysis.question_patterns[0].examples[0].chars().count(), 100);
    }

    #[test]
    fn test_snippet_score_all_conditions() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"FAQPage"}</script></head><body>
            <p>Who we are. What we do. How it works.</p>
            <h1>a</h1><h2>b</h2><h2>c</h2><h3>d</h3><h3>e</h3>
            <ul><li>one</li></ul><table><tr><td>1</td></tr></table></body></html>"#;
        let analysis = run(html);
        assert_eq!(analysis.featured_snippet_score, 100);
        assert!(analysis.answer_readiness_score <= 100);
    }

    #[test]
    fn test_readiness_is_clamped() {
        let html = r#"<html><head>
            <script type="application/ld+json">[{"@type":"FAQPage"},{"@type":"HowTo"}]</script></head><body>
            <p>How to find the best tips. Read our guide and review.</p>
            <ul><li>x</li></ul></body></html>"#;
        let analysis = run(html);
        assert_eq!(analysis.answer_readiness_score, 100);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        let analysis = run("<p>Our stopwatch is bestselling. Find the top guide.</p>");
        assert_eq!(analysis.conversational_keywords, vec!["top", "find", "guide"]);
    }

    #[test]
    fn test_no_questions_issue() {
        let analysis = run("<p>Plain statement.</p>");
        let issue = &analysis.issues[0];
        assert_eq!(issue.kind, "no-question-patterns");
        assert_eq!(issue.severity, Severity::High);
        assert!(analysis.issues.iter().any(|i| i.kind == "low-conversational-tone"));
    }

    #[test]
    fn test_question_issues_and_opportunities() {
        let html = "<p>Who are we?</p><p>What do we sell?</p><p>How do I order?</p><p>Visit our location today.</p>";
        let analysis = run(html);
        let types: Vec<_> = analysis.issues.iter().map(|i| i.kind.as_str()).collect();
        assert!(types.contains(&"missing-faq-schema"));
        assert!(types.contains(&"missing-howto-schema"));
        assert!(types.contains(&"missing-structured-lists"));
        assert!(types.contains(&"no-concise-answers"));

        let keywords: Vec<_> = analysis
            .long_tail_opportunities
            .iter()
            .map(|o| o.keyword.as_str())
            .collect();
        assert_eq!(
            keywords,
            vec!["who example.com", "what example.com", "how example.com", "near me queries"]
        );
    }
}
