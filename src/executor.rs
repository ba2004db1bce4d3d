//! Transformation Executor: drives Reader → Engine → Writer for one page, a
//! batch of pages, or a whole library.
//!
//! Every page moves through `Queued -> Running -> {Completed, Failed}`. A
//! failing page never aborts its siblings; the failure is recorded in its own
//! [`TransformationResult`]. Batches run on a bounded number of concurrent
//! pages and can be cancelled through a [`CancellationHandle`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use crate::engine::{TransformContext, transform};
use crate::error::TransformError;
use crate::mapping::MappingRuleSet;
use crate::model::{PageLocator, TargetPage, UnsupportedWebPart, UserIdentity};
use crate::options::TransformationOptions;
use crate::platform::{SiteApi, parse_page_url};
use crate::progress::{NoopProgress, ProgressEvent, ProgressSink, Stage};
use crate::reader::{PageReader, source_error};
use crate::retry::{CallError, CallSettings, RetryPolicy, call_with_retry};
use crate::writer::PageWriter;

/// Lifecycle state of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
  Queued,
  Running,
  Completed,
  Failed,
}

impl fmt::Display for ExecutionState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Self::Queued => "queued",
      Self::Running => "running",
      Self::Completed => "completed",
      Self::Failed => "failed",
    };
    f.write_str(label)
  }
}

/// Outcome of transforming one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationResult {
  pub source: PageLocator,
  pub state: ExecutionState,
  /// Final locator of the written page (completed pages only).
  pub target: Option<PageLocator>,
  /// Originating error (failed pages only).
  pub error: Option<TransformError>,
  /// Web parts that had no mapping.
  pub unsupported_web_parts: Vec<UnsupportedWebPart>,
  /// Whether the target site's home page was repointed at this page.
  pub replaces_home_page: bool,
}

impl TransformationResult {
  fn queued(source: PageLocator) -> Self {
    Self {
      source,
      state: ExecutionState::Queued,
      target: None,
      error: None,
      unsupported_web_parts: Vec::new(),
      replaces_home_page: false,
    }
  }

  fn fail(mut self, error: TransformError) -> Self {
    self.state = ExecutionState::Failed;
    self.error = Some(error);
    self
  }

  pub fn is_completed(&self) -> bool {
    self.state == ExecutionState::Completed
  }
}

/// Results of a batch, in the order the pages were submitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResult {
  pub results: Vec<TransformationResult>,
}

impl BatchResult {
  pub fn completed(&self) -> usize {
    self.results.iter().filter(|r| r.is_completed()).count()
  }

  pub fn failed(&self) -> usize {
    self
      .results
      .iter()
      .filter(|r| r.state == ExecutionState::Failed)
      .count()
  }

  /// Whether every page completed.
  pub fn is_success(&self) -> bool {
    self.failed() == 0
  }
}

/// Concurrency, timeout, and retry settings of an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
  /// Maximum number of pages in flight during a batch.
  pub concurrency: usize,
  /// Timeout of every individual site call.
  pub call_timeout: Duration,
  pub retry: RetryPolicy,
}

impl Default for ExecutorSettings {
  fn default() -> Self {
    Self {
      concurrency: 4,
      call_timeout: Duration::from_secs(30),
      retry: RetryPolicy::default(),
    }
  }
}

impl ExecutorSettings {
  fn call_settings(&self) -> CallSettings {
    CallSettings {
      timeout: self.call_timeout,
      retry: self.retry,
    }
  }
}

/// Cancels the in-flight pages of a batch. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
  sender: Arc<watch::Sender<bool>>,
}

impl Default for CancellationHandle {
  fn default() -> Self {
    Self::new()
  }
}

impl CancellationHandle {
  pub fn new() -> Self {
    let (sender, _) = watch::channel(false);
    Self {
      sender: Arc::new(sender),
    }
  }

  /// Request cancellation. Idempotent.
  pub fn cancel(&self) {
    self.sender.send_replace(true);
  }

  pub fn is_cancelled(&self) -> bool {
    *self.sender.borrow()
  }

  /// Resolves once cancellation has been requested.
  pub async fn cancelled(&self) {
    let mut receiver = self.sender.subscribe();
    // The sender lives as long as `self`, so this only returns on cancel.
    let _ = receiver.wait_for(|cancelled| *cancelled).await;
  }
}

/// What a successful page run produced.
struct PageOutcome {
  target: PageLocator,
  unsupported_web_parts: Vec<UnsupportedWebPart>,
  replaces_home_page: bool,
}

/// Runs transformations from a source site to a target site.
pub struct TransformationExecutor {
  source: Arc<dyn SiteApi>,
  target: Arc<dyn SiteApi>,
  rules: Arc<MappingRuleSet>,
  options: TransformationOptions,
  settings: ExecutorSettings,
  progress: Arc<dyn ProgressSink>,
  actor: OnceCell<UserIdentity>,
}

impl TransformationExecutor {
  /// Create an executor.
  ///
  /// URLs pointing into the source site are rewritten to the target site
  /// unless the rule set already maps the source site explicitly.
  pub fn new(
    source: Arc<dyn SiteApi>,
    target: Arc<dyn SiteApi>,
    mut rules: MappingRuleSet,
    options: TransformationOptions,
  ) -> Self {
    rules.add_site_url_mapping(source.site_url(), target.site_url());

    Self {
      source,
      target,
      rules: Arc::new(rules),
      options,
      settings: ExecutorSettings::default(),
      progress: Arc::new(NoopProgress),
      actor: OnceCell::new(),
    }
  }

  pub fn with_settings(mut self, settings: ExecutorSettings) -> Self {
    self.settings = settings;
    self
  }

  pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
    self.progress = progress;
    self
  }

  /// Use `actor` instead of asking the target site for the current user.
  pub fn with_actor(mut self, actor: UserIdentity) -> Self {
    self.actor = OnceCell::new_with(Some(actor));
    self
  }

  pub fn options(&self) -> &TransformationOptions {
    &self.options
  }

  /// Transform a single page.
  pub async fn transform_page(&self, locator: &PageLocator) -> TransformationResult {
    self.run_page(locator, 1, 1, &CancellationHandle::new()).await
  }

  /// Transform every page in `locators`, at most `concurrency` at a time.
  ///
  /// # Returns
  /// One result per locator, in input order.
  pub async fn transform_batch(&self, locators: Vec<PageLocator>, cancel: &CancellationHandle) -> BatchResult {
    let total = locators.len();
    info!(
      "Transforming {total} page(s) with concurrency {}",
      self.settings.concurrency
    );

    for (idx, locator) in locators.iter().enumerate() {
      self.emit(Stage::PageQueued, format!("Queued {locator}"), idx + 1, total);
    }

    let mut indexed: Vec<(usize, TransformationResult)> = stream::iter(locators.into_iter().enumerate())
      .map(|(idx, locator)| async move { (idx, self.run_page(&locator, idx + 1, total, cancel).await) })
      .buffer_unordered(self.settings.concurrency.max(1))
      .collect()
      .await;
    indexed.sort_by_key(|(idx, _)| *idx);

    let batch = BatchResult {
      results: indexed.into_iter().map(|(_, result)| result).collect(),
    };
    info!(
      "Batch finished: {} completed, {} failed",
      batch.completed(),
      batch.failed()
    );
    batch
  }

  /// Transform every page of a source library.
  ///
  /// # Errors
  /// Fails only when the library cannot be listed; page failures are
  /// reported in the batch result.
  pub async fn transform_library(&self, library: &str, cancel: &CancellationHandle) -> Result<BatchResult, TransformError> {
    let locators = self.library_pages(library).await?;
    Ok(self.transform_batch(locators, cancel).await)
  }

  /// Locators of every page in a source library. Paths that cannot be parsed
  /// are skipped with a warning.
  pub async fn library_pages(&self, library: &str) -> Result<Vec<PageLocator>, TransformError> {
    let calls = self.settings.call_settings();
    let subject = format!("{}/{}", self.source.site_url(), library);

    let paths = call_with_retry(&calls, &format!("list pages of {library}"), || {
      self.source.list_pages(library)
    })
    .await
    .map_err(|e| source_error(&subject, e))?;
    debug!("Library {subject} holds {} page(s)", paths.len());

    let mut locators = Vec::with_capacity(paths.len());
    for path in paths {
      match parse_page_url(self.source.site_url(), &path) {
        Ok(locator) => locators.push(locator),
        Err(e) => warn!("Skipping unrecognised page path {path}: {e}"),
      }
    }
    Ok(locators)
  }

  /// Read and transform `locator` without writing anything.
  ///
  /// # Errors
  /// Returns the reader's error, or [`TransformError::InvalidOptionCombination`]
  /// when the options conflict.
  pub async fn preview_page(&self, locator: &PageLocator) -> Result<TargetPage, TransformError> {
    self.options.validate()?;
    let calls = self.settings.call_settings();

    let source_page = PageReader::new(self.source.as_ref(), calls)
      .read(locator, &self.options.source)
      .await?;
    let ctx = self.context(&calls, locator).await?;

    let target_page = transform(&source_page, &self.rules, &self.options, &ctx);
    debug!("Previewed {locator} -> {} ({} web parts)", target_page.locator, target_page.web_part_count());
    Ok(target_page)
  }

  async fn run_page(
    &self,
    locator: &PageLocator,
    position: usize,
    total: usize,
    cancel: &CancellationHandle,
  ) -> TransformationResult {
    let mut result = TransformationResult::queued(locator.clone());

    if cancel.is_cancelled() {
      self.emit(Stage::PageFailed, format!("Cancelled {locator}"), position, total);
      return result.fail(TransformError::Cancelled);
    }

    result.state = ExecutionState::Running;
    self.emit(Stage::PageStarted, format!("Transforming {locator}"), position, total);

    let outcome = tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(TransformError::Cancelled),
      outcome = self.pipeline(locator, position, total) => outcome,
    };

    match outcome {
      Ok(outcome) => {
        self.emit(
          Stage::PageWritten,
          format!("{locator} -> {}", outcome.target),
          position,
          total,
        );
        result.state = ExecutionState::Completed;
        result.target = Some(outcome.target);
        result.unsupported_web_parts = outcome.unsupported_web_parts;
        result.replaces_home_page = outcome.replaces_home_page;
        result
      }
      Err(error) => {
        warn!("Transformation of {locator} failed: {error}");
        self.emit(Stage::PageFailed, format!("{locator}: {error}"), position, total);
        result.fail(error)
      }
    }
  }

  async fn pipeline(&self, locator: &PageLocator, position: usize, total: usize) -> Result<PageOutcome, TransformError> {
    let calls = self.settings.call_settings();

    let source_page = PageReader::new(self.source.as_ref(), calls)
      .read(locator, &self.options.source)
      .await?;
    self.emit(
      Stage::PageRead,
      format!("Read {locator} ({} web parts)", source_page.web_part_count()),
      position,
      total,
    );

    let ctx = self.context(&calls, locator).await?;
    let target_page = transform(&source_page, &self.rules, &self.options, &ctx);

    let sections = target_page.sections.len();
    for (idx, section) in target_page.sections.iter().enumerate() {
      self.emit(
        Stage::SectionTransformed,
        format!("{locator}: section {} holds {} web parts", idx + 1, section.web_part_count()),
        idx + 1,
        sections,
      );
    }

    let target = PageWriter::new(self.target.as_ref(), calls)
      .write(&target_page, &self.options)
      .await?;

    Ok(PageOutcome {
      target,
      unsupported_web_parts: target_page.unsupported_web_parts,
      replaces_home_page: target_page.replaces_home_page,
    })
  }

  /// Build the transformation context. The acting user is only looked up
  /// when the page gets stamped with it.
  async fn context(&self, calls: &CallSettings, locator: &PageLocator) -> Result<TransformContext, TransformError> {
    let actor = if self.options.page.keep_page_creation_modification_information {
      UserIdentity::new(String::new())
    } else {
      self.actor(calls, locator).await?
    };

    Ok(TransformContext {
      actor,
      now: Utc::now(),
      target_site_url: self.target.site_url().to_string(),
    })
  }

  /// The acting user, resolved once per executor from the target site.
  async fn actor(&self, calls: &CallSettings, locator: &PageLocator) -> Result<UserIdentity, TransformError> {
    self
      .actor
      .get_or_try_init(|| async {
        let user = call_with_retry(calls, "resolve current user", || self.target.current_user())
          .await
          .map_err(|e| match e {
            CallError::Timeout { operation, seconds } => TransformError::Timeout { operation, seconds },
            CallError::Site(e) => TransformError::write(locator.to_string(), format!("cannot resolve current user: {e}")),
          })?;
        Ok::<_, TransformError>(UserIdentity {
          login: user.login,
          display_name: Some(user.display_name),
        })
      })
      .await
      .cloned()
  }

  fn emit(&self, stage: Stage, message: String, progress: usize, total: usize) {
    self
      .progress
      .on_event(&ProgressEvent::new(stage, message, progress, total));
  }
}
