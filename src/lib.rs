pub mod analyzer;
pub mod config;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod test_utils;

pub use analyzer::{
    analyze, analyze_all, analyze_competitive, analyze_geographic, analyze_voice_search,
    FullAnalysis,
};
pub use error::{AppError, Result};
