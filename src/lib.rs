pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::AvwxHttpFetcher, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use crate::core::{builder::FixtureBuilder, writer::FixtureWriter, writer::RunSummary};
pub use domain::model::{Fixture, ReportKind};
pub use utils::error::{FixtureError, Result};
