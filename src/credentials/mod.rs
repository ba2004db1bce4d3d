//! Credential discovery for source and target sites.
//!
//! Explicit `--source-*` / `--target-*` flags win. After that the shared
//! `PAGE_TRANSFORMER_USER` / `PAGE_TRANSFORMER_TOKEN` variables are used, and
//! finally the site host's entry in `~/.netrc`:
//!
//! ```text
//! machine contoso.sharepoint.com
//!   login svc-migration@contoso.com
//!   password <password or app secret>
//! ```

mod netrc;
mod provider;
mod types;

pub use netrc::NetrcProvider;
pub use provider::{CredentialsProvider, EnvProvider, first_match};
pub use types::{Credential, CredentialError};

/// Prefix of the shared credential environment variables.
pub const ENV_PREFIX: &str = "PAGE_TRANSFORMER";
