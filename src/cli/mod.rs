//! CLI module for ssewire.
//!
//! Parses command-line flags into overrides for [`crate::ClientConfig`].
//!
//! # Usage
//!
//! ```ignore
//! use clap::Parser;
//! use ssewire::cli::Cli;
//! use ssewire::ClientConfig;
//!
//! let cli = Cli::parse();
//! let config = cli.apply(ClientConfig::from_env()?);
//! ```

pub mod args;

pub use args::{parse_header, Cli};
