//! ReportAssembler - merges analyzer outputs into one categorized report.

use chrono::Utc;

use crate::domain::{
    category_of, AuditIssue, AuditReport, AuditResult, CompetitiveAnalysis, GeographicAnalysis,
    IssueBucket, IssueCategory, SemanticAnalysis, VoiceSearchAnalysis,
};

pub struct ReportAssembler;

impl ReportAssembler {
    /// Bucket every issue by its category and attach the auxiliary analyses.
    /// The report has no id until it is stored.
    pub fn assemble(
        url: &str,
        audit: AuditResult,
        geographic: GeographicAnalysis,
        voice_search: VoiceSearchAnalysis,
        competitive: CompetitiveAnalysis,
        semantic: Option<SemanticAnalysis>,
    ) -> AuditReport {
        let all_issues = audit
            .issues()
            .iter()
            .chain(geographic.issues.iter())
            .chain(voice_search.issues.iter())
            .chain(semantic.iter().flat_map(|s| s.issues.iter()));

        let (technical, on_page, semantic_issues) = Self::categorize(all_issues);

        tracing::debug!(
            "[ASSEMBLE] {} - technical: {}, on-page: {}, semantic: {}",
            url,
            technical.len(),
            on_page.len(),
            semantic_issues.len()
        );

        AuditReport {
            id: None,
            url: url.to_string(),
            created_at: Utc::now(),
            audit,
            technical_seo: IssueBucket::from_issues(technical),
            on_page_seo: IssueBucket::from_issues(on_page),
            semantic_seo: IssueBucket::from_issues(semantic_issues),
            geographic,
            voice_search,
            competitive,
            semantic,
        }
    }

    fn categorize<'a>(
        issues: impl Iterator<Item = &'a AuditIssue>,
    ) -> (Vec<AuditIssue>, Vec<AuditIssue>, Vec<AuditIssue>) {
        let mut technical = Vec::new();
        let mut on_page = Vec::new();
        let mut semantic = Vec::new();

        for issue in issues {
            match category_of(&issue.kind) {
                IssueCategory::Technical => technical.push(issue.clone()),
                IssueCategory::OnPage => on_page.push(issue.clone()),
                IssueCategory::Semantic => semantic.push(issue.clone()),
            }
        }

        (technical, on_page, semantic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_all;
    use crate::domain::Severity;
    use crate::service::semantic::HeuristicSemanticEstimator;
    use crate::test_utils::fixtures::missing_title_and_description_page;

    #[test]
    fn test_issues_are_bucketed_by_category() {
        let url = "https://example.com/";
        let all = analyze_all(&missing_title_and_description_page(), url).unwrap();
        let semantic = HeuristicSemanticEstimator.estimate("text", &[]);

        let report = ReportAssembler::assemble(
            url,
            all.audit,
            all.geographic,
            all.voice_search,
            all.competitive,
            Some(semantic),
        );

        let on_page: Vec<_> = report.on_page_seo.issues.iter().map(|i| i.kind.as_str()).collect();
        assert!(on_page.contains(&"missing-title"));
        assert!(on_page.contains(&"missing-meta-description"));
        assert!(report
            .semantic_seo
            .issues
            .iter()
            .any(|i| i.kind == "semantic-quality"));
        assert!(report
            .semantic_seo
            .issues
            .iter()
            .any(|i| i.kind == "no-question-patterns"));
        let technical: Vec<_> = report.technical_seo.issues.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(technical, vec!["missing-og-locale"]);
        assert_eq!(report.on_page_seo.score, 70);
        assert!(report.id.is_none());
    }

    #[test]
    fn test_unknown_types_default_to_technical() {
        let issues = vec![AuditIssue::new("something-new", Severity::Low, "new check")];
        let (technical, on_page, semantic) = ReportAssembler::categorize(issues.iter());
        assert_eq!(technical.len(), 1);
        assert!(on_page.is_empty());
        assert!(semantic.is_empty());
    }
}
