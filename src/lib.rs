// Export modules for use in tests
pub mod export;
pub mod panic_handler;
pub mod pdf;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the comparison entry points
pub use pdf::{CompareConfig, CompareError, Comparison, HighlightStatus, PageSource, compare};
