//! `page-transformer extract-template`.

use std::path::Path;
use std::process;

use super::transform::ConsoleProgress;
use super::{SiteRole, connect_or_exit};
use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::progress::{ProgressSink, TracingProgress};
use crate::template::{FileSystemConnector, TemplateCreationOptions, XmlFileSystemTemplateProvider, extract_template};

/// Extract the provisioning template of `site_url` and store it as
/// `output/name`. Branding files, when requested, land in `output/branding`.
pub(crate) async fn handle_extract_template(
  site_url: &str,
  output: &Path,
  name: &str,
  persist_branding_files: bool,
  cli: &Cli,
  colors: &ColorScheme,
) {
  let client = connect_or_exit(SiteRole::Source, site_url, cli, colors);
  let persist_branding_files = persist_branding_files && !cli.behavior.dry_run;

  let options = TemplateCreationOptions {
    persist_branding_files,
    file_connector: persist_branding_files.then(|| FileSystemConnector::new(output, "branding")),
  };

  let console = ConsoleProgress::new(*colors);
  let progress: &dyn ProgressSink = if cli.behavior.quiet { &TracingProgress } else { &console };

  let template = match extract_template(&client, &options, progress).await {
    Ok(template) => template,
    Err(e) => {
      eprintln!("{} Failed to extract template: {e:#}", colors.error("✗"));
      process::exit(1);
    }
  };

  if cli.behavior.dry_run {
    println!(
      "{} Would write {} ({} lists, {} content types, {} files)",
      colors.info("ℹ"),
      colors.path(output.join(name).display()),
      template.lists.len(),
      template.content_types.len(),
      template.files.len()
    );
    return;
  }

  let provider = XmlFileSystemTemplateProvider::new(output, "");
  match provider.save_as(&template, name) {
    Ok(path) => {
      println!(
        "{} Saved template of {} to {}",
        colors.success("✓"),
        colors.link(site_url),
        colors.path(path.display())
      );
      let persisted = template.files.iter().filter(|file| file.persisted).count();
      if persisted > 0 {
        println!("  {} branding file(s) stored", colors.number(persisted));
      }
    }
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("✗"));
      process::exit(1);
    }
  }
}
