//! Prospect Core - Foundation crate for the Prospect research pipeline.
//!
//! This crate provides the shared configuration surface and result types
//! that the query client and its consumers depend on.
//!
//! # Modules
//!
//! - [`config`] - Environment-sourced tuning knobs for the query client
//! - [`types`] - Shared result types (`SearchHit`, `InstantAnswer`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod types;

// Re-export commonly used types
pub use config::SearchConfig;
pub use types::{InstantAnswer, InstantAnswerTopic, SearchHit};
