pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod query;
pub mod reconcile;
pub mod schema;
pub mod source;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use error::ImportError;
pub use pipeline::{run_import, ImportSummary};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
