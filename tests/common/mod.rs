pub mod fake_site;
pub mod fixtures;
