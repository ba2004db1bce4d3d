//! Command-line interface definitions for page-transformer.
//!
//! Flags are grouped into flattened option structs; [`TransformArgs`] maps its
//! flags onto [`TransformationOptions`] so the library never sees clap types.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::color::ColorScheme;
use crate::commands::auth::{AuthCommand, handle_auth_command};
use crate::commands::completions::{Shell, handle_completions_command};
use crate::commands::mapping::{MappingCommand, handle_mapping_command};
use crate::commands::template::handle_extract_template;
use crate::commands::transform::handle_transform_command;
use crate::commands::version::handle_version_command;
use crate::executor::ExecutorSettings;
use crate::mapping::MappingSources;
use crate::options::TransformationOptions;
use crate::platform::normalize_site_url;
use crate::retry::RetryPolicy;

/// Process exit codes.
pub mod exit_code {
  pub const PAGES_FAILED: i32 = 1;
  pub const CREDENTIALS: i32 = 2;
  pub const MAPPING: i32 = 3;
  pub const INVALID_ARGUMENTS: i32 = 4;
}

/// page-transformer - Transform classic pages into modern pages
#[derive(Debug, Parser)]
#[command(
  name = "page-transformer",
  version,
  about = "Transform classic collaboration-site pages into modern pages",
  long_about = "Reads classic wiki and web-part pages from a source site, maps their web parts, layout,\n\
                users, and URLs, and writes modern pages to a target site.",
  styles = get_clap_styles()
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,

  /// Site and credential options
  #[command(flatten)]
  pub sites: SiteOptions,

  /// Mapping definition files
  #[command(flatten)]
  pub mapping: MappingOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,

  /// Performance options
  #[command(flatten)]
  pub performance: PerformanceOptions,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Transform one or more classic pages
  Transform(TransformArgs),

  /// Extract a provisioning template from a site
  ExtractTemplate {
    /// Site to extract
    #[arg(value_name = "SITE_URL", value_parser = parse_site_url)]
    site_url: String,

    /// Directory the template is written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output: PathBuf,

    /// File name of the template document
    #[arg(long, default_value = "template.xml", value_name = "FILE")]
    name: String,

    /// Download branding files next to the template
    #[arg(long)]
    persist_branding_files: bool,
  },

  /// Inspect mapping definitions
  Mapping {
    #[command(subcommand)]
    subcommand: MappingCommand,
  },

  /// Authentication testing and inspection
  Auth {
    #[command(subcommand)]
    subcommand: AuthCommand,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    #[arg(value_enum)]
    shell: Shell,
  },
}

fn parse_site_url(url: &str) -> Result<String, String> {
  normalize_site_url(url).map_err(|e| e.to_string())
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
  match value.split_once('=') {
    Some((key, val)) if !key.trim().is_empty() => Ok((key.trim().to_string(), val.to_string())),
    _ => Err(format!("expected KEY=VALUE, got '{value}'")),
  }
}

/// Source and target sites with their credentials.
#[derive(Debug, Args)]
pub struct SiteOptions {
  /// Site the classic pages are read from
  #[arg(long, global = true, env = "PAGE_TRANSFORMER_SOURCE_URL", value_name = "URL", value_parser = parse_site_url)]
  pub source_url: Option<String>,

  /// Site the modern pages are written to (defaults to the source site)
  #[arg(long, global = true, env = "PAGE_TRANSFORMER_TARGET_URL", value_name = "URL", value_parser = parse_site_url)]
  pub target_url: Option<String>,

  /// User name for the source site (on-premises authentication)
  #[arg(long, global = true, env = "PAGE_TRANSFORMER_SOURCE_USER", value_name = "USER")]
  pub source_user: Option<String>,

  /// Password or access token for the source site
  #[arg(long, global = true, env = "PAGE_TRANSFORMER_SOURCE_TOKEN", value_name = "TOKEN", hide_env_values = true)]
  pub source_token: Option<String>,

  /// User name for the target site (on-premises authentication)
  #[arg(long, global = true, env = "PAGE_TRANSFORMER_TARGET_USER", value_name = "USER")]
  pub target_user: Option<String>,

  /// Password or access token for the target site
  #[arg(long, global = true, env = "PAGE_TRANSFORMER_TARGET_TOKEN", value_name = "TOKEN", hide_env_values = true)]
  pub target_token: Option<String>,
}

impl SiteOptions {
  /// Target site URL, falling back to the source site.
  pub fn effective_target_url(&self) -> Option<&str> {
    self.target_url.as_deref().or(self.source_url.as_deref())
  }
}

/// Mapping definition files; absent files use the built-in tables.
#[derive(Debug, Args)]
pub struct MappingOptions {
  /// Web-part and layout mapping XML
  #[arg(long, global = true, value_name = "FILE")]
  pub web_part_mapping: Option<PathBuf>,

  /// User mapping (`source,target` lines)
  #[arg(long, global = true, value_name = "FILE")]
  pub user_mapping: Option<PathBuf>,

  /// URL mapping (`source,target` lines)
  #[arg(long, global = true, value_name = "FILE")]
  pub url_mapping: Option<PathBuf>,
}

impl MappingOptions {
  pub fn sources(&self) -> MappingSources {
    MappingSources {
      web_part_mapping_file: self.web_part_mapping.clone(),
      user_mapping_file: self.user_mapping.clone(),
      url_mapping_file: self.url_mapping.clone(),
    }
  }
}

#[derive(Debug, Args)]
pub struct BehaviorOptions {
  /// Read and transform pages without writing anything
  #[arg(long, global = true)]
  pub dry_run: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

#[derive(Debug, Args)]
pub struct PerformanceOptions {
  /// Number of pages transformed concurrently (`-1` uses available cores)
  #[arg(long, global = true, default_value = "4", value_name = "N", allow_negative_numbers = true)]
  pub parallel: isize,

  /// Max requests per second, per site
  #[arg(long, global = true, default_value = "10", value_name = "N")]
  pub rate_limit: usize,

  /// Timeout of each site call in seconds
  #[arg(long, global = true, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,

  /// Attempts per site call when it fails transiently
  #[arg(long, global = true, default_value = "3", value_name = "N")]
  pub retries: u32,
}

impl PerformanceOptions {
  /// Resolve the parallel limit into a concrete positive value.
  pub fn resolved_parallel(&self) -> usize {
    match self.parallel {
      value if value > 0 => value as usize,
      -1 => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
      _ => 1,
    }
  }

  pub fn executor_settings(&self) -> ExecutorSettings {
    ExecutorSettings {
      concurrency: self.resolved_parallel(),
      call_timeout: std::time::Duration::from_secs(self.timeout),
      retry: RetryPolicy {
        max_attempts: self.retries,
        ..RetryPolicy::default()
      },
    }
  }
}

/// Arguments of `page-transformer transform`.
#[derive(Debug, Args)]
pub struct TransformArgs {
  /// Page URLs or site-relative paths (e.g. SitePages/Home.aspx)
  #[arg(value_name = "PAGE_URL")]
  pub pages: Vec<String>,

  /// Transform every page of the source library
  #[arg(long)]
  pub all: bool,

  /// Library used with --all
  #[arg(long, default_value = "SitePages", value_name = "NAME")]
  pub library: String,

  /// JSON file with transformation options; flags override its values
  #[arg(long, value_name = "FILE")]
  pub options_file: Option<PathBuf>,

  #[command(flatten)]
  pub page: PageFlags,

  #[command(flatten)]
  pub source: SourceFlags,
}

/// Flags controlling the created modern page.
#[derive(Debug, Args, Default)]
pub struct PageFlags {
  /// Replace target pages that already exist
  #[arg(long)]
  pub overwrite: bool,

  /// Leave the target page as a draft
  #[arg(long)]
  pub no_publish: bool,

  /// Promote the target page as a news post
  #[arg(long)]
  pub post_as_news: bool,

  /// Turn off page comments
  #[arg(long)]
  pub disable_comments: bool,

  /// Copy custom metadata fields of the source page
  #[arg(long)]
  pub copy_metadata: bool,

  /// Keep the source author, editor, and timestamps
  #[arg(long)]
  pub keep_creation_info: bool,

  /// Do not copy unique page permissions
  #[arg(long)]
  pub no_permissions: bool,

  /// Make the target the new home page when the source is the home page
  #[arg(long)]
  pub replace_home_page: bool,

  /// Add an author banner at the top of the page
  #[arg(long)]
  pub author_in_header: bool,

  /// Folder inside SitePages for target pages
  #[arg(long, value_name = "FOLDER")]
  pub target_folder: Option<String>,

  /// Explicit target page name
  #[arg(long, value_name = "NAME")]
  pub target_name: Option<String>,

  /// Prefix for derived target page names
  #[arg(long, value_name = "PREFIX")]
  pub target_prefix: Option<String>,

  /// Derive target names from page titles instead of source file names
  #[arg(long)]
  pub name_from_title: bool,
}

/// Flags controlling how source pages are read.
#[derive(Debug, Args, Default)]
pub struct SourceFlags {
  /// Keep empty sections and columns
  #[arg(long)]
  pub keep_empty_sections: bool,

  /// Do not translate user identities
  #[arg(long)]
  pub no_user_mapping: bool,

  /// Leave inline wiki images and videos inside the text
  #[arg(long)]
  pub no_wiki_media: bool,

  /// Do not turn list and table images into image web parts
  #[arg(long)]
  pub no_table_list_images: bool,

  /// Keep title-bar web parts
  #[arg(long)]
  pub include_title_bar: bool,

  /// Keep hidden web parts
  #[arg(long)]
  pub include_hidden: bool,

  /// Leave URLs untouched
  #[arg(long)]
  pub skip_url_rewrite: bool,

  /// Value available to mapping rules as {KEY} (repeatable)
  #[arg(long = "mapping-property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
  pub mapping_properties: Vec<(String, String)>,
}

impl TransformArgs {
  /// Build the option set: the options file (or library defaults) with every
  /// given flag applied on top.
  ///
  /// # Errors
  /// Returns an error when the options file cannot be read or parsed.
  pub fn transformation_options(&self) -> anyhow::Result<TransformationOptions> {
    use anyhow::Context;

    let mut options = match &self.options_file {
      Some(path) => {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str::<TransformationOptions>(&text)
          .with_context(|| format!("Invalid options file {}", path.display()))?
      }
      None => TransformationOptions::default(),
    };

    let page = &mut options.page;
    let flags = &self.page;
    page.overwrite |= flags.overwrite;
    page.publish_page &= !flags.no_publish;
    page.post_as_news |= flags.post_as_news;
    page.disable_page_comments |= flags.disable_comments;
    page.copy_page_metadata |= flags.copy_metadata;
    page.keep_page_creation_modification_information |= flags.keep_creation_info;
    page.keep_page_specific_permissions &= !flags.no_permissions;
    page.replace_home_page_with_default_home_page |= flags.replace_home_page;
    page.set_author_in_page_header |= flags.author_in_header;
    page.target_page_takes_source_page_name &= !flags.name_from_title;
    if let Some(folder) = &flags.target_folder {
      page.target_page_folder = folder.clone();
    }
    if let Some(name) = &flags.target_name {
      page.target_page_name = name.clone();
    }
    if let Some(prefix) = &flags.target_prefix {
      page.target_page_prefix = prefix.clone();
    }

    let source = &mut options.source;
    let flags = &self.source;
    source.remove_empty_sections_and_columns &= !flags.keep_empty_sections;
    source.should_map_users &= !flags.no_user_mapping;
    source.handle_wiki_images_and_videos &= !flags.no_wiki_media;
    source.add_table_list_image_as_image_web_part &= !flags.no_table_list_images;
    source.include_title_bar_web_part |= flags.include_title_bar;
    source.skip_hidden_web_parts &= !flags.include_hidden;
    source.skip_url_rewrite |= flags.skip_url_rewrite;
    source
      .mapping_properties
      .extend(flags.mapping_properties.iter().cloned().collect::<BTreeMap<_, _>>());

    Ok(options)
  }
}

impl Cli {
  /// Reject invalid argument combinations before any network call.
  pub fn validate(&self) -> Result<(), String> {
    if self.performance.parallel == 0 || self.performance.parallel < -1 {
      return Err("--parallel must be at least 1 or -1 to use available cores".to_string());
    }

    if self.performance.rate_limit == 0 {
      return Err("--rate-limit must be at least 1 request per second".to_string());
    }

    if self.performance.retries == 0 {
      return Err("--retries must be at least 1".to_string());
    }

    if let Command::Transform(args) = &self.command {
      if args.all && !args.pages.is_empty() {
        return Err("--all cannot be combined with explicit page URLs".to_string());
      }
      if !args.all && args.pages.is_empty() {
        return Err("Provide at least one page URL or use --all".to_string());
      }
      if self.sites.source_url.is_none() {
        return Err("--source-url is required (or set PAGE_TRANSFORMER_SOURCE_URL)".to_string());
      }
      if args.page.post_as_news && args.page.replace_home_page {
        return Err("--post-as-news cannot be combined with --replace-home-page".to_string());
      }
      if args.page.target_name.is_some() && (args.all || args.pages.len() > 1) {
        return Err("--target-name can only be used with a single page".to_string());
      }
    }

    Ok(())
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub async fn run() {
  let cli = Cli::parse();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(exit_code::INVALID_ARGUMENTS);
  }

  match &cli.command {
    Command::Transform(args) => handle_transform_command(args, &cli, &colors).await,
    Command::ExtractTemplate {
      site_url,
      output,
      name,
      persist_branding_files,
    } => handle_extract_template(site_url, output, name, *persist_branding_files, &cli, &colors).await,
    Command::Mapping { subcommand } => handle_mapping_command(subcommand, &cli, &colors),
    Command::Auth { subcommand } => handle_auth_command(subcommand, &cli, &colors).await,
    Command::Version { json, short } => handle_version_command(*json, *short, &colors),
    Command::Completions { shell } => handle_completions_command(*shell),
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
