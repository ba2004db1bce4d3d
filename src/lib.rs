//! Classic-to-modern page transformation.
//!
//! The pipeline reads a classic page through a [`platform::SiteApi`] session
//! ([`reader`]), translates it with a [`mapping::MappingRuleSet`] ([`engine`]),
//! and persists the result on the target site ([`writer`]).
//! [`executor::TransformationExecutor`] drives single pages, batches, and whole
//! libraries with retries, timeouts, and cancellation.

pub mod cli;
pub mod color;
pub mod commands;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod model;
pub mod options;
pub mod platform;
pub mod progress;
pub mod reader;
pub mod retry;
pub mod template;
pub mod writer;
