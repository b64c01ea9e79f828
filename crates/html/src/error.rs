//! HTML parsing error types

use thiserror::Error;

/// HTML parsing result type
pub type HtmlResult<T> = Result<T, HtmlError>;

/// HTML parsing errors
///
/// Markup itself never fails to parse; malformed input is recovered from
/// and logged.
#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("Invalid fragment context: {0:?}")]
    InvalidContext(String),
}
