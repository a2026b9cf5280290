//! Writes an `index.json` manifest into every directory of an image tree.
//!
//! Each manifest lists the image files sitting directly in its directory,
//! so a static front end can enumerate a gallery folder without a server.

pub mod args;
pub mod config;
pub mod error;
pub mod indexer;
pub mod manifest;
pub mod sink;

pub use config::IndexerConfig;
pub use error::{IndexError, Result};
pub use indexer::{IndexStats, Indexer};
pub use manifest::Manifest;
pub use sink::{ConsoleSink, LogSink, ProgressSink};
