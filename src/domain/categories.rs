//! Issue type to display category mapping.
//!
//! This is the one table the presentation layer should read; the assembler
//! uses it to bucket flat issue lists.

use super::models::IssueCategory;

pub const CATEGORY_TABLE: &[(&str, IssueCategory)] = &[
    // core analyzer
    ("missing-title", IssueCategory::OnPage),
    ("empty-title", IssueCategory::OnPage),
    ("short-title", IssueCategory::OnPage),
    ("long-title", IssueCategory::OnPage),
    ("missing-meta-description", IssueCategory::OnPage),
    ("short-meta-description", IssueCategory::OnPage),
    ("long-meta-description", IssueCategory::OnPage),
    ("missing-h1", IssueCategory::OnPage),
    ("multiple-h1", IssueCategory::OnPage),
    ("no-h2-headings", IssueCategory::OnPage),
    ("missing-image-alt", IssueCategory::OnPage),
    ("few-internal-links", IssueCategory::OnPage),
    ("missing-og-tags", IssueCategory::OnPage),
    ("missing-viewport", IssueCategory::Technical),
    ("missing-canonical", IssueCategory::Technical),
    ("missing-structured-data", IssueCategory::Technical),
    ("robots-restriction", IssueCategory::Technical),
    ("thin-content", IssueCategory::Semantic),
    // geographic analyzer
    ("missing-x-default", IssueCategory::Technical),
    ("invalid-hreflang", IssueCategory::Technical),
    ("duplicate-hreflang", IssueCategory::Technical),
    ("missing-hreflang", IssueCategory::Technical),
    ("missing-local-schema", IssueCategory::Technical),
    ("missing-og-locale", IssueCategory::Technical),
    ("missing-map-embed", IssueCategory::OnPage),
    // voice-search analyzer
    ("no-question-patterns", IssueCategory::Semantic),
    ("missing-faq-schema", IssueCategory::Semantic),
    ("missing-howto-schema", IssueCategory::Semantic),
    ("low-conversational-tone", IssueCategory::Semantic),
    ("missing-structured-lists", IssueCategory::Semantic),
    ("no-concise-answers", IssueCategory::Semantic),
    // semantic estimator
    ("semantic-quality", IssueCategory::Semantic),
];

/// Category for an issue type. Unknown types are shown under technical.
pub fn category_of(kind: &str) -> IssueCategory {
    CATEGORY_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, category)| *category)
        .unwrap_or(IssueCategory::Technical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_no_duplicate_keys() {
        let mut seen = HashSet::new();
        for (kind, _) in CATEGORY_TABLE {
            assert!(seen.insert(*kind), "duplicate category entry: {}", kind);
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(category_of("missing-title"), IssueCategory::OnPage);
        assert_eq!(category_of("robots-restriction"), IssueCategory::Technical);
        assert_eq!(category_of("thin-content"), IssueCategory::Semantic);
        assert_eq!(category_of("something-new"), IssueCategory::Technical);
    }
}
