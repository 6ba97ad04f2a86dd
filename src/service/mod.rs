pub mod assembler;
pub mod audit_service;
pub mod cache;
pub mod fetcher;
pub mod semantic;

pub use assembler::ReportAssembler;
pub use audit_service::AuditService;
pub use cache::TtlCache;
pub use fetcher::{create_client, validate_url, FetchedPage, HtmlFetcher, HttpFetcher};
pub use semantic::{
    estimator_from_config, HeuristicSemanticEstimator, LlmSemanticEstimator, SemanticEstimator,
};
