//! page-transformer - Transform classic collaboration-site pages into modern
//! pages.

#[tokio::main]
async fn main() {
  page_transformer::cli::run().await;
}
