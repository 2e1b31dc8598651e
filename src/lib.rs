pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;
pub use crate::config::TomlConfig;

pub use crate::adapters::clock::{ManualClock, SystemClock};
pub use crate::adapters::http::{DryRunSink, HttpSink};
pub use crate::adapters::storage::LocalStorage;
pub use crate::app::console::Console;
pub use crate::core::session::{IngestOutcome, TransferSession};
pub use crate::domain::model::{ConfirmationMode, EntrySource, LifecycleState};
pub use crate::utils::error::{Result, TransferError};
