#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factsheet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod edgar;
pub mod error;

pub use cache::{DocumentCache, MemoryCache, SqliteCache};
pub use edgar::{Cik, FactsDocument, Fetcher, FetcherConfig, Resolver, Transport};
pub use error::{DataError, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
