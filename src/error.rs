//! Error taxonomy for the transformation pipeline.
//!
//! Every failure that can be attributed to a single page is expressed as a
//! [`TransformError`] so the executor can record it against that page and
//! carry on with the rest of a batch. Remote API failures start life as
//! [`SiteError`](crate::platform::SiteError) and are translated by the reader
//! and writer depending on which side of the pipeline raised them.

use thiserror::Error;

/// Failure of one step of a page transformation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
  /// The source page does not exist.
  #[error("source page not found: {0}")]
  SourceNotFound(String),

  /// The source session may not read the page.
  #[error("access denied reading source page: {0}")]
  SourceAccessDenied(String),

  /// The source page structure, layout, or wiki HTML could not be parsed.
  #[error("failed to parse source page {locator}: {message}")]
  SourceParseError { locator: String, message: String },

  /// A mapping definition is malformed.
  #[error("invalid mapping definition ({origin}): {message}")]
  MappingLoadError { origin: String, message: String },

  /// Overwrite is disabled and the target page already exists.
  #[error("target page already exists: {0}")]
  TargetAlreadyExists(String),

  /// Two requested options cannot be honoured together.
  #[error("invalid option combination: {0}")]
  InvalidOptionCombination(String),

  /// A remote call did not finish within the configured timeout.
  #[error("operation timed out after {seconds}s: {operation}")]
  Timeout { operation: String, seconds: u64 },

  /// Persisting the target page failed.
  #[error("failed to write target page {locator}: {message}")]
  TargetWriteError { locator: String, message: String },

  /// The source could not be reached after all retries.
  #[error("source site unreachable: {0}")]
  Connectivity(String),

  /// The batch was cancelled before this page finished.
  #[error("transformation cancelled")]
  Cancelled,
}

impl TransformError {
  /// Create a source parse error for the page at `locator`.
  pub fn parse(locator: impl Into<String>, message: impl Into<String>) -> Self {
    Self::SourceParseError {
      locator: locator.into(),
      message: message.into(),
    }
  }

  /// Create a mapping load error attributed to `origin` (a file path or
  /// `"built-in"`).
  pub fn mapping(origin: impl Into<String>, message: impl Into<String>) -> Self {
    Self::MappingLoadError {
      origin: origin.into(),
      message: message.into(),
    }
  }

  /// Create a target write error for the page at `locator`.
  pub fn write(locator: impl Into<String>, message: impl Into<String>) -> Self {
    Self::TargetWriteError {
      locator: locator.into(),
      message: message.into(),
    }
  }

  /// Short machine-friendly name of the variant, used in reports and logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::SourceNotFound(_) => "SourceNotFound",
      Self::SourceAccessDenied(_) => "SourceAccessDenied",
      Self::SourceParseError { .. } => "SourceParseError",
      Self::MappingLoadError { .. } => "MappingLoadError",
      Self::TargetAlreadyExists(_) => "TargetAlreadyExists",
      Self::InvalidOptionCombination(_) => "InvalidOptionCombination",
      Self::Timeout { .. } => "Timeout",
      Self::TargetWriteError { .. } => "TargetWriteError",
      Self::Connectivity(_) => "Connectivity",
      Self::Cancelled => "Cancelled",
    }
  }
}
