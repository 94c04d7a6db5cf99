//! Configuration system for Strata.
//!
//! Provides runtime-configurable terrain streaming settings that persist to disk
//! as RON files. Supports CLI overrides via clap, hot-reload detection,
//! forward/backward compatible serialization, and up-front validation of the
//! construction preconditions the terrain components rely on.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, DemoConfig, FarLodConfig, LodConfig, StreamingConfig, WorldConfig,
};
pub use error::ConfigError;
