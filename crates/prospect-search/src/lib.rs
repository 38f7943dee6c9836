//! Prospect Search - Resilient query client for a rate-sensitive search surface.
//!
//! This crate is the outbound edge of the research pipeline: it issues
//! free-text lookups against DuckDuckGo's scrape-only endpoints while
//! respecting a global request budget, recovering from transient
//! throttling, and skipping redundant network calls through a persistent
//! response cache.
//!
//! # Features
//!
//! - Single serialized request lane with spacing, jitter, and a sliding
//!   per-minute cap
//! - Process-wide, forward-only cooldown tripped by throttling responses
//! - Bounded exponential retry over a fixed transient-status set
//! - TTL-bounded response cache persisted as a single JSON document
//! - Deterministic query normalization shared by cache keys and requests
//!
//! # Example
//!
//! ```rust,ignore
//! use prospect_core::SearchConfig;
//! use prospect_search::SearchClient;
//!
//! let client = SearchClient::new(&SearchConfig::from_env())?;
//! let hits = client.search("Acme Robotics", 5).await?;
//! let answer = client.instant_answer("Acme Robotics").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]

pub mod cache;
pub mod client;
pub mod error;
pub mod normalize;
pub mod parser;

mod pacing;
mod retry;
mod scheduler;

// Re-export commonly used types
pub use cache::{cache_key, ResponseCache};
pub use client::SearchClient;
pub use error::{Result, SearchError, RETRYABLE_STATUS};
pub use normalize::normalize_query;
pub use parser::{parse_search_results, resolve_result_url};
