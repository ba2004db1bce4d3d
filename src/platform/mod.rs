//! Site platform module providing the capability trait, the HTTP client and
//! its authentication variants, wire models, and URL parsing helpers.

pub mod api;
pub mod auth;
pub mod client;
pub mod models;
pub mod url;

pub use api::{SiteApi, SiteError};
pub use auth::{Authenticator, ModernAuth, OnPremisesAuth};
pub use client::SiteClient;
pub use models::{
  ColumnDocument, ContentTypeInfo, FileInfo, ListInfo, PageDocument, SectionDocument, SiteStructure, UserInfo,
  WebPartDocument,
};
pub use url::{normalize_site_url, parse_page_url};
