pub mod categories;
pub mod models;

pub use categories::{category_of, CATEGORY_TABLE};
pub use models::*;
