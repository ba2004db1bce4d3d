//! `page-transformer transform`: run the pipeline from the command line.

use std::process;
use std::sync::Arc;

use unicode_width::UnicodeWidthStr;

use super::{SiteRole, connect_or_exit};
use crate::cli::{Cli, TransformArgs, exit_code};
use crate::color::ColorScheme;
use crate::executor::{BatchResult, CancellationHandle, ExecutionState, TransformationExecutor, TransformationResult};
use crate::model::PageLocator;
use crate::platform::{SiteApi, parse_page_url};
use crate::progress::{ProgressEvent, ProgressSink, Stage, TracingProgress};

/// Progress sink printing one colored line per page checkpoint.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
  colors: ColorScheme,
}

impl ConsoleProgress {
  pub fn new(colors: ColorScheme) -> Self {
    Self { colors }
  }
}

impl ProgressSink for ConsoleProgress {
  fn on_event(&self, event: &ProgressEvent) {
    let counter = self
      .colors
      .progress(format!("[{:>width$}/{}]", event.progress, event.total, width = event.total.to_string().len()));
    match event.stage {
      Stage::PageStarted | Stage::TemplateStep => println!("{counter} {}", event.message),
      Stage::PageWritten => println!("{counter} {} {}", self.colors.success("✓"), event.message),
      Stage::PageFailed => println!("{counter} {} {}", self.colors.error("✗"), event.message),
      Stage::PageQueued | Stage::PageRead | Stage::SectionTransformed => {}
    }
  }
}

/// Handle `page-transformer transform`.
///
/// Exits with code 3 when the mapping files are invalid, 4 when options
/// conflict or a page reference cannot be parsed, 2 when credentials are
/// missing, and 1 when at least one page failed.
pub(crate) async fn handle_transform_command(args: &TransformArgs, cli: &Cli, colors: &ColorScheme) {
  let rules = match cli.mapping.sources().load() {
    Ok(rules) => rules,
    Err(e) => {
      eprintln!("{} {e}", colors.error("✗"));
      process::exit(exit_code::MAPPING);
    }
  };

  let options = match args.transformation_options() {
    Ok(options) => options,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("Error:"));
      process::exit(exit_code::INVALID_ARGUMENTS);
    }
  };
  if let Err(e) = options.validate() {
    eprintln!("{} {e}", colors.error("Error:"));
    process::exit(exit_code::INVALID_ARGUMENTS);
  }

  let (Some(source_url), Some(target_url)) = (cli.sites.source_url.as_deref(), cli.sites.effective_target_url()) else {
    eprintln!("{} --source-url is required", colors.error("Error:"));
    process::exit(exit_code::INVALID_ARGUMENTS);
  };

  let mut locators = Vec::with_capacity(args.pages.len());
  for page in &args.pages {
    match parse_page_url(source_url, page) {
      Ok(locator) => locators.push(locator),
      Err(e) => {
        eprintln!("{} {page}: {e:#}", colors.error("Error:"));
        process::exit(exit_code::INVALID_ARGUMENTS);
      }
    }
  }

  let source: Arc<dyn SiteApi> = Arc::new(connect_or_exit(SiteRole::Source, source_url, cli, colors));
  let target: Arc<dyn SiteApi> = Arc::new(connect_or_exit(SiteRole::Target, target_url, cli, colors));

  let progress: Arc<dyn ProgressSink> = if cli.behavior.quiet {
    Arc::new(TracingProgress)
  } else {
    Arc::new(ConsoleProgress::new(*colors))
  };

  let executor = TransformationExecutor::new(source, target, rules, options)
    .with_settings(cli.performance.executor_settings())
    .with_progress(progress);

  if cli.behavior.dry_run {
    if args.all {
      locators = match executor.library_pages(&args.library).await {
        Ok(locators) => locators,
        Err(e) => {
          eprintln!("{} {e}", colors.error("✗"));
          process::exit(exit_code::PAGES_FAILED);
        }
      };
    }
    preview(&executor, &locators, colors).await;
    return;
  }

  let cancel = CancellationHandle::new();
  let batch = if args.all {
    match executor.transform_library(&args.library, &cancel).await {
      Ok(batch) => batch,
      Err(e) => {
        eprintln!("{} {e}", colors.error("✗"));
        process::exit(exit_code::PAGES_FAILED);
      }
    }
  } else {
    executor.transform_batch(locators, &cancel).await
  };

  if !cli.behavior.quiet {
    print_report(&batch, colors);
  }

  if !batch.is_success() {
    process::exit(exit_code::PAGES_FAILED);
  }
}

async fn preview(executor: &TransformationExecutor, locators: &[PageLocator], colors: &ColorScheme) {
  let mut failed = false;
  for locator in locators {
    match executor.preview_page(locator).await {
      Ok(page) => {
        println!("{} {}", colors.info("→"), colors.link(locator));
        println!("  {}: {}", colors.dimmed("Target"), colors.link(&page.locator));
        println!(
          "  {}: {} ({} sections, {} web parts)",
          colors.dimmed("Layout"),
          page.layout,
          colors.number(page.sections.len()),
          colors.number(page.web_part_count())
        );
        for unsupported in &page.unsupported_web_parts {
          println!(
            "  {} unmapped {} '{}'",
            colors.warning("⚠"),
            unsupported.web_part_type,
            unsupported.title
          );
        }
      }
      Err(e) => {
        failed = true;
        eprintln!("{} {locator}: {e}", colors.error("✗"));
      }
    }
  }
  if failed {
    process::exit(exit_code::PAGES_FAILED);
  }
}

/// Per-page outcome column.
fn outcome(result: &TransformationResult) -> String {
  match (&result.target, &result.error) {
    (_, Some(error)) => format!("{}: {error}", error.kind()),
    (Some(target), None) => {
      let mut text = target.url();
      if result.replaces_home_page {
        text.push_str(" (home page)");
      }
      if !result.unsupported_web_parts.is_empty() {
        text.push_str(&format!(" [{} unmapped]", result.unsupported_web_parts.len()));
      }
      text
    }
    (None, None) => String::new(),
  }
}

/// Render the batch as an aligned table: one line per page, then a summary.
pub(crate) fn render_report(batch: &BatchResult, colors: &ColorScheme) -> String {
  let rows: Vec<(String, ExecutionState, String)> = batch
    .results
    .iter()
    .map(|result| (result.source.site_relative_path(), result.state, outcome(result)))
    .collect();

  let source_width = rows
    .iter()
    .map(|(source, _, _)| source.width())
    .chain(["Page".width()])
    .max()
    .unwrap_or_default();
  let state_width = rows
    .iter()
    .map(|(_, state, _)| state.to_string().width())
    .chain(["State".width()])
    .max()
    .unwrap_or_default();

  let mut out = String::new();
  out.push_str(&format!(
    "{}  {}  {}\n",
    colors.emphasis(pad("Page", source_width)),
    colors.emphasis(pad("State", state_width)),
    colors.emphasis("Result")
  ));
  for (source, state, outcome) in &rows {
    let state_text = colors.for_state(*state, pad(&state.to_string(), state_width));
    out.push_str(&format!("{}  {}  {}\n", pad(source, source_width), state_text, outcome));
  }

  out.push_str(&format!(
    "\n{} completed, {} failed, {} total\n",
    colors.success(batch.completed()),
    if batch.failed() > 0 { colors.error(batch.failed()) } else { batch.failed().to_string() },
    batch.results.len()
  ));
  out
}

fn print_report(batch: &BatchResult, colors: &ColorScheme) {
  if batch.results.is_empty() {
    println!("{} No pages to transform", colors.info("ℹ"));
    return;
  }
  print!("\n{}", render_report(batch, colors));
}

/// Left-align `text` in a column of `width` display cells.
fn pad(text: &str, width: usize) -> String {
  format!("{text}{}", " ".repeat(width.saturating_sub(text.width())))
}
