//! Glue between the command line and the library crates.
//!
//! Cache location, logging setup and the progress-reporting campaign run.

pub(crate) mod cache_manager;
pub(crate) mod logging;
pub(crate) mod pipeline;
