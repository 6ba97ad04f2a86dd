pub mod page_extractor;

pub use page_extractor::{HreflangLink, PageExtractor, PageSignals};
