//! Locating, downloading and memoizing the comment-checker executable

pub mod locator;
pub mod resolver;

pub use locator::{BinaryLocator, ReleaseLocator};
pub use resolver::BinaryResolver;
