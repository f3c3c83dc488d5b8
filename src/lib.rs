//! codesearch
//!
//! Indexes the source trees of a configured set of git repositories into a
//! search store, one document per source line, each annotated with the
//! repository, file path, line number and a best-effort function name.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod storage;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};
