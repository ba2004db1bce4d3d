//! End-to-end tests using the fake site client
//!
//! These tests drive the executor against in-memory source and target sites
//! and check what ends up on the target, including failure isolation,
//! retries, timeouts, and cancellation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fake_site::FakeSiteClient;
use common::fixtures::{self, SOURCE_SITE, TARGET_SITE};
use page_transformer::error::TransformError;
use page_transformer::executor::{CancellationHandle, ExecutionState, ExecutorSettings, TransformationExecutor};
use page_transformer::mapping::MappingRuleSet;
use page_transformer::model::{PageLocator, PermissionEntry, UserIdentity};
use page_transformer::options::TransformationOptions;
use page_transformer::platform::SiteError;
use page_transformer::progress::{RecordingProgress, Stage};
use page_transformer::retry::RetryPolicy;
use page_transformer::template::{
  FileSystemConnector, TemplateCreationOptions, XmlFileSystemTemplateProvider, extract_template,
};
use tempfile::TempDir;

fn locator(name: &str) -> PageLocator {
  PageLocator::new(SOURCE_SITE, "SitePages", "", name)
}

fn settings() -> ExecutorSettings {
  ExecutorSettings {
    concurrency: 4,
    call_timeout: Duration::from_secs(5),
    retry: RetryPolicy {
      max_attempts: 3,
      base_delay: Duration::from_millis(1),
    },
  }
}

fn executor(
  source: &Arc<FakeSiteClient>,
  target: &Arc<FakeSiteClient>,
  options: TransformationOptions,
) -> TransformationExecutor {
  TransformationExecutor::new(source.clone(), target.clone(), MappingRuleSet::builtin(), options)
    .with_settings(settings())
    .with_actor(UserIdentity::new("i:0#.f|membership|migrator@contoso.example"))
}

fn web_part_types(page: &page_transformer::platform::PageDocument) -> Vec<Vec<Vec<String>>> {
  page
    .sections
    .iter()
    .map(|section| {
      section
        .columns
        .iter()
        .map(|column| column.web_parts.iter().map(|part| part.web_part_type.clone()).collect())
        .collect()
    })
    .collect()
}

#[tokio::test]
async fn test_transform_page_with_prefix() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.page.target_page_prefix = "Migrated_".to_string();

  let result = executor(&source, &target, options).transform_page(&locator("Team.aspx")).await;

  assert_eq!(result.state, ExecutionState::Completed, "{:?}", result.error);
  let written = result.target.unwrap();
  assert_eq!(written.url(), format!("{TARGET_SITE}/SitePages/Migrated_Team.aspx"));
  assert!(target.page("SitePages/Migrated_Team.aspx").is_some());
  assert_eq!(target.call_count("publish_page"), 1);
  assert_eq!(target.call_count("promote_as_news"), 0);
}

#[tokio::test]
async fn test_hidden_parts_title_bar_and_empty_sections_are_dropped() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let result = executor(&source, &target, TransformationOptions::default())
    .transform_page(&locator("Team.aspx"))
    .await;
  assert!(result.is_completed(), "{:?}", result.error);

  let page = target.page("SitePages/Team.aspx").unwrap();
  assert_eq!(
    web_part_types(&page),
    vec![vec![vec!["Text"]], vec![vec!["Embed"], vec!["UnsupportedWebPart"]]]
  );
  assert_eq!(page.layout, "Article");

  // Links into the source site point at the target site.
  let embed = &page.sections[1].columns[0].web_parts[0];
  assert_eq!(
    embed.properties["embedUrl"],
    "https://contoso.example/sites/modern/SiteAssets/map.html"
  );

  let placeholder = &page.sections[1].columns[1].web_parts[0];
  assert_eq!(placeholder.title, "Weather");
  assert_eq!(result.unsupported_web_parts.len(), 1);
  assert!(result.unsupported_web_parts[0].placeholder);
}

#[tokio::test]
async fn test_keeping_hidden_parts_and_empty_sections() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.source.skip_hidden_web_parts = false;
  options.source.remove_empty_sections_and_columns = false;
  options.source.include_title_bar_web_part = true;

  let result = executor(&source, &target, options).transform_page(&locator("Team.aspx")).await;
  assert!(result.is_completed(), "{:?}", result.error);

  let page = target.page("SitePages/Team.aspx").unwrap();
  assert_eq!(
    web_part_types(&page),
    vec![
      vec![vec!["PageTitle", "Text"]],
      vec![vec!["Text"], vec![]],
      vec![vec!["Embed"], vec!["UnsupportedWebPart"]],
    ]
  );
  assert!(page.sections[1].columns[0].web_parts[0].hidden);
}

#[tokio::test]
async fn test_existing_target_is_not_overwritten() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(
    FakeSiteClient::new(TARGET_SITE).with_page("SitePages/Team.aspx", fixtures::existing_modern_page()),
  );

  let result = executor(&source, &target, TransformationOptions::default())
    .transform_page(&locator("Team.aspx"))
    .await;

  assert_eq!(result.state, ExecutionState::Failed);
  assert!(matches!(result.error, Some(TransformError::TargetAlreadyExists(_))));
  assert_eq!(target.call_count("save_page"), 0);
  assert_eq!(target.page("SitePages/Team.aspx").unwrap().title, "Already migrated");
}

#[tokio::test]
async fn test_overwrite_reapplies_existing_permissions() {
  let existing = vec![PermissionEntry {
    principal: "c:0+.w|contoso\\owners".to_string(),
    role: "Full Control".to_string(),
  }];
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::simple_page("Team")));
  let target = Arc::new(
    FakeSiteClient::new(TARGET_SITE)
      .with_page("SitePages/Team.aspx", fixtures::existing_modern_page())
      .with_permissions("SitePages/Team.aspx", existing.clone()),
  );

  let mut options = TransformationOptions::default();
  options.page.overwrite = true;

  let result = executor(&source, &target, options).transform_page(&locator("Team.aspx")).await;

  assert!(result.is_completed(), "{:?}", result.error);
  assert_eq!(target.page("SitePages/Team.aspx").unwrap().title, "Team");
  assert_eq!(target.permissions_of("SitePages/Team.aspx"), Some(existing));
  assert_eq!(target.call_count("set_page_permissions"), 1);
}

#[tokio::test]
async fn test_source_permissions_and_metadata_are_carried() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.page.copy_page_metadata = true;
  options.page.keep_page_creation_modification_information = true;

  let result = executor(&source, &target, options).transform_page(&locator("Team.aspx")).await;
  assert!(result.is_completed(), "{:?}", result.error);

  let page = target.page("SitePages/Team.aspx").unwrap();
  assert_eq!(page.fields["Department"], "Sales");
  assert_eq!(page.author.unwrap().login, "i:0#.w|contoso\\jane");
  assert!(page.created.unwrap().starts_with("2020-01-10T09:00:00"));

  let permissions = target.permissions_of("SitePages/Team.aspx").unwrap();
  assert_eq!(permissions.len(), 2);
  assert_eq!(permissions[1].role, "Read");
}

#[tokio::test]
async fn test_actor_is_stamped_without_creation_information() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  // No explicit actor: the executor asks the target site who is signed in.
  let executor = TransformationExecutor::new(
    source.clone(),
    target.clone(),
    MappingRuleSet::builtin(),
    TransformationOptions::default(),
  )
  .with_settings(settings());
  let result = executor.transform_page(&locator("Team.aspx")).await;
  assert!(result.is_completed(), "{:?}", result.error);

  let page = target.page("SitePages/Team.aspx").unwrap();
  assert_eq!(page.author.unwrap().login, "i:0#.f|membership|migrator@contoso.example");
  assert!(page.fields.is_empty());
  assert_eq!(target.call_count("current_user"), 1);
}

#[tokio::test]
async fn test_current_user_not_resolved_when_creation_information_is_kept() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.page.keep_page_creation_modification_information = true;
  let executor = TransformationExecutor::new(source.clone(), target.clone(), MappingRuleSet::builtin(), options)
    .with_settings(settings());

  let preview = executor.preview_page(&locator("Team.aspx")).await.unwrap();
  assert_eq!(preview.metadata.author.unwrap().login, "i:0#.w|contoso\\jane");

  let result = executor.transform_page(&locator("Team.aspx")).await;
  assert!(result.is_completed(), "{:?}", result.error);

  let page = target.page("SitePages/Team.aspx").unwrap();
  assert_eq!(page.author.unwrap().login, "i:0#.w|contoso\\jane");
  assert_eq!(target.call_count("current_user"), 0);
}

#[tokio::test]
async fn test_home_page_replacement() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Home.aspx", fixtures::wiki_home_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.page.replace_home_page_with_default_home_page = true;
  options.page.target_page_prefix = "Migrated_".to_string();

  let result = executor(&source, &target, options).transform_page(&locator("Home.aspx")).await;
  assert!(result.is_completed(), "{:?}", result.error);
  assert!(result.replaces_home_page);

  let page = target.page("SitePages/Migrated_Home.aspx").unwrap();
  assert_eq!(page.layout, "Home");
  assert!(page.is_home_page);
  assert_eq!(target.home_page(), "SitePages/Migrated_Home.aspx");

  // Wiki text, the embedded query web part in place, then the sidebar media.
  assert_eq!(
    web_part_types(&page),
    vec![vec![vec!["Text", "HighlightedContent"], vec!["Text", "Image"]]]
  );
  let text = page.sections[0].columns[0].web_parts[0].properties["text"].as_str().unwrap();
  assert!(text.contains("https://contoso.example/sites/modern/SitePages/Guide.aspx"));
}

#[tokio::test]
async fn test_home_page_not_replaced_by_default() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Home.aspx", fixtures::wiki_home_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let result = executor(&source, &target, TransformationOptions::default())
    .transform_page(&locator("Home.aspx"))
    .await;
  assert!(result.is_completed(), "{:?}", result.error);
  assert!(!result.replaces_home_page);
  assert_eq!(target.page("SitePages/Home.aspx").unwrap().layout, "Article");
  assert_eq!(target.call_count("set_home_page"), 0);
}

#[tokio::test]
async fn test_invalid_option_combination_writes_nothing() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Home.aspx", fixtures::wiki_home_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.page.post_as_news = true;
  options.page.replace_home_page_with_default_home_page = true;

  let result = executor(&source, &target, options).transform_page(&locator("Home.aspx")).await;

  assert_eq!(result.state, ExecutionState::Failed);
  assert!(matches!(result.error, Some(TransformError::InvalidOptionCombination(_))));
  assert_eq!(target.call_count("page_exists"), 0);
  assert_eq!(target.call_count("save_page"), 0);
}

#[tokio::test]
async fn test_batch_isolates_failures() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/One.aspx", fixtures::simple_page("One"))
      .with_page("SitePages/Three.aspx", fixtures::simple_page("Three")),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let cancel = CancellationHandle::new();
  let batch = executor(&source, &target, TransformationOptions::default())
    .transform_batch(
      vec![locator("One.aspx"), locator("Missing.aspx"), locator("Three.aspx")],
      &cancel,
    )
    .await;

  let states: Vec<ExecutionState> = batch.results.iter().map(|r| r.state).collect();
  assert_eq!(
    states,
    vec![ExecutionState::Completed, ExecutionState::Failed, ExecutionState::Completed]
  );
  assert!(matches!(batch.results[1].error, Some(TransformError::SourceNotFound(_))));
  assert_eq!(batch.completed(), 2);
  assert!(!batch.is_success());

  // Not-found is permanent: no retries.
  let missing_reads = source
    .calls()
    .iter()
    .filter(|call| call.as_str() == "get_page SitePages/Missing.aspx")
    .count();
  assert_eq!(missing_reads, 1);
}

#[tokio::test]
async fn test_access_denied_is_reported() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/Secret.aspx", fixtures::simple_page("Secret"))
      .with_failure("SitePages/Secret.aspx", SiteError::AccessDenied("403".to_string())),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let result = executor(&source, &target, TransformationOptions::default())
    .transform_page(&locator("Secret.aspx"))
    .await;
  assert!(matches!(result.error, Some(TransformError::SourceAccessDenied(_))));
  assert_eq!(source.call_count("get_page"), 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/Flaky.aspx", fixtures::simple_page("Flaky"))
      .with_transient_failures("SitePages/Flaky.aspx", 2),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let result = executor(&source, &target, TransformationOptions::default())
    .transform_page(&locator("Flaky.aspx"))
    .await;

  assert!(result.is_completed(), "{:?}", result.error);
  assert_eq!(source.call_count("get_page"), 3);
}

#[tokio::test]
async fn test_transient_failures_exhaust_retries() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/Flaky.aspx", fixtures::simple_page("Flaky"))
      .with_transient_failures("SitePages/Flaky.aspx", 10),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let result = executor(&source, &target, TransformationOptions::default())
    .transform_page(&locator("Flaky.aspx"))
    .await;

  assert!(matches!(result.error, Some(TransformError::Connectivity(_))));
  assert_eq!(source.call_count("get_page"), 3);
}

#[tokio::test]
async fn test_slow_source_times_out() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/Slow.aspx", fixtures::simple_page("Slow"))
      .with_delay("SitePages/Slow.aspx", Duration::from_secs(10)),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut settings = settings();
  settings.call_timeout = Duration::from_millis(50);
  let executor = executor(&source, &target, TransformationOptions::default()).with_settings(settings);

  let result = executor.transform_page(&locator("Slow.aspx")).await;
  assert_eq!(result.state, ExecutionState::Failed);
  assert!(matches!(result.error, Some(TransformError::Timeout { .. })));
  // Timeouts are not retried.
  assert_eq!(source.call_count("get_page"), 1);
}

#[tokio::test]
async fn test_batch_preserves_input_order_under_concurrency() {
  let names = ["A.aspx", "B.aspx", "C.aspx", "D.aspx"];
  let delays = [120, 5, 60, 30];
  let mut source = FakeSiteClient::new(SOURCE_SITE);
  for (name, delay) in names.iter().zip(delays) {
    let path = format!("SitePages/{name}");
    source = source
      .with_page(&path, fixtures::simple_page(name))
      .with_delay(&path, Duration::from_millis(delay));
  }
  let source = Arc::new(source);
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let progress = Arc::new(RecordingProgress::new());
  let executor = executor(&source, &target, TransformationOptions::default()).with_progress(progress.clone());
  let batch = executor
    .transform_batch(names.iter().map(|name| locator(name)).collect(), &CancellationHandle::new())
    .await;

  let sources: Vec<String> = batch.results.iter().map(|r| r.source.name.clone()).collect();
  assert_eq!(sources, names);
  assert!(batch.is_success());

  let events = progress.events();
  let queued = events.iter().filter(|e| e.stage == Stage::PageQueued).count();
  let written = events.iter().filter(|e| e.stage == Stage::PageWritten).count();
  assert_eq!((queued, written), (4, 4));
  assert!(events.iter().all(|e| e.total > 0 && e.progress <= e.total));
}

#[tokio::test]
async fn test_rerun_with_overwrite_is_idempotent() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let mut options = TransformationOptions::default();
  options.page.overwrite = true;
  let executor = executor(&source, &target, options);

  assert!(executor.transform_page(&locator("Team.aspx")).await.is_completed());
  let first = target.page("SitePages/Team.aspx").unwrap();
  assert!(executor.transform_page(&locator("Team.aspx")).await.is_completed());
  let second = target.page("SitePages/Team.aspx").unwrap();

  assert_eq!(web_part_types(&first), web_part_types(&second));
  assert_eq!(first.sections, second.sections);
}

#[tokio::test]
async fn test_cancelled_batch_reads_nothing() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/One.aspx", fixtures::simple_page("One")));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let cancel = CancellationHandle::new();
  cancel.cancel();
  let batch = executor(&source, &target, TransformationOptions::default())
    .transform_batch(vec![locator("One.aspx"), locator("Two.aspx")], &cancel)
    .await;

  assert!(
    batch
      .results
      .iter()
      .all(|r| r.state == ExecutionState::Failed && r.error == Some(TransformError::Cancelled))
  );
  assert_eq!(source.call_count("get_page"), 0);
}

#[tokio::test]
async fn test_cancel_interrupts_in_flight_page() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/Slow.aspx", fixtures::simple_page("Slow"))
      .with_delay("SitePages/Slow.aspx", Duration::from_secs(10)),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));
  let executor = executor(&source, &target, TransformationOptions::default());

  let cancel = CancellationHandle::new();
  let (batch, _) = tokio::join!(executor.transform_batch(vec![locator("Slow.aspx")], &cancel), async {
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
  });

  assert_eq!(batch.results[0].error, Some(TransformError::Cancelled));
  assert_eq!(target.call_count("save_page"), 0);
}

#[tokio::test]
async fn test_transform_library() {
  let source = Arc::new(
    FakeSiteClient::new(SOURCE_SITE)
      .with_page("SitePages/Home.aspx", fixtures::wiki_home_page())
      .with_page("SitePages/news/Team.aspx", fixtures::team_news_page())
      .with_library("SitePages", &["SitePages/Home.aspx", "SitePages/news/Team.aspx", "SitePages"]),
  );
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let batch = executor(&source, &target, TransformationOptions::default())
    .transform_library("SitePages", &CancellationHandle::new())
    .await
    .unwrap();

  // The bare library path cannot be parsed and is skipped.
  assert_eq!(batch.results.len(), 2);
  assert!(batch.is_success());
  assert!(target.page("SitePages/news/Team.aspx").is_some());
}

#[tokio::test]
async fn test_transform_missing_library() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let error = executor(&source, &target, TransformationOptions::default())
    .transform_library("Pages", &CancellationHandle::new())
    .await
    .unwrap_err();
  assert!(matches!(error, TransformError::SourceNotFound(_)));
}

#[tokio::test]
async fn test_preview_writes_nothing() {
  let source = Arc::new(FakeSiteClient::new(SOURCE_SITE).with_page("SitePages/Team.aspx", fixtures::team_news_page()));
  let target = Arc::new(FakeSiteClient::new(TARGET_SITE));

  let page = executor(&source, &target, TransformationOptions::default())
    .preview_page(&locator("Team.aspx"))
    .await
    .unwrap();

  assert_eq!(page.locator.site_url, TARGET_SITE);
  assert_eq!(page.web_part_count(), 3);
  assert!(target.calls().is_empty());
}

#[tokio::test]
async fn test_extract_template_with_branding_files() {
  let site = FakeSiteClient::new(SOURCE_SITE)
    .with_structure(fixtures::site_structure())
    .with_file("_catalogs/masterpage/contoso.css", b"body { color: #0078d4; }");
  let temp_dir = TempDir::new().unwrap();

  let options = TemplateCreationOptions {
    persist_branding_files: true,
    file_connector: Some(FileSystemConnector::new(temp_dir.path(), "branding")),
  };
  let progress = RecordingProgress::new();
  let template = extract_template(&site, &options, &progress).await.unwrap();

  assert_eq!(template.site_title, "Classic Intranet");
  assert_eq!(template.lists.len(), 2);
  assert_eq!(template.content_types[0].field_refs, vec!["Title", "Body", "Expires"]);
  assert!(template.files[0].persisted);
  assert!(!template.files[1].persisted);
  assert_eq!(site.call_count("fetch_file"), 1);

  let stored = std::fs::read_to_string(temp_dir.path().join("branding/_catalogs/masterpage/contoso.css")).unwrap();
  assert_eq!(stored, "body { color: #0078d4; }");

  let steps: Vec<String> = progress.events().into_iter().map(|e| e.message).collect();
  assert_eq!(steps, vec!["Lists (2)", "Content types (1)", "Files (2)"]);

  let provider = XmlFileSystemTemplateProvider::new(temp_dir.path(), "");
  provider.save_as(&template, "template.xml").unwrap();
  assert_eq!(provider.load("template.xml").unwrap(), template);
}

#[tokio::test]
async fn test_extract_template_without_persisting() {
  let site = FakeSiteClient::new(SOURCE_SITE).with_structure(fixtures::site_structure());

  let template = extract_template(
    &site,
    &TemplateCreationOptions::default(),
    &page_transformer::progress::NoopProgress,
  )
  .await
  .unwrap();

  assert!(template.files.iter().all(|file| !file.persisted));
  assert_eq!(site.call_count("fetch_file"), 0);
}

#[tokio::test]
async fn test_extract_template_rejects_untitled_list() {
  let site = FakeSiteClient::new(SOURCE_SITE).with_structure(fixtures::broken_site_structure());

  let error = extract_template(
    &site,
    &TemplateCreationOptions::default(),
    &page_transformer::progress::NoopProgress,
  )
  .await
  .unwrap_err();

  assert!(error.to_string().contains("List #2 at 'Lists/Untitled' has no title"));
}
