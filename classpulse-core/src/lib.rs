//! # classpulse-core
//!
//! Core library for classpulse, an instructor metrics engine for fitness
//! studios.
//!
//! This library provides:
//! - Domain types for schedule slots, attendance records and calendar months
//! - Validation of raw record input at the ingestion boundary
//! - Pure analytics: punctuality, distribution, trends, scoring, comparison, ranking
//! - A TTL cache of computed metrics bundles
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use classpulse_core::{Config, MetricsEngine};
//! use classpulse_core::ingest::parse_records_json;
//!
//! let config = Config::load().expect("failed to load config");
//! let engine = MetricsEngine::with_config(config);
//!
//! let json = std::fs::read_to_string("records.json").expect("failed to read records");
//! let records = parse_records_json(&json).expect("malformed records");
//!
//! let params = engine.params().focus("2025-03".parse().expect("bad month"));
//! let bundle = engine
//!     .metrics_bundle(7, &records, &params, false)
//!     .expect("failed to compute metrics");
//! println!("{} -> {}", bundle.period_label, bundle.score.score);
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{BundleParams, CohortSnapshot, MetricsBundle, RankingMetric};
pub use cache::{Clock, ManualClock, MetricsCache, SystemClock};
pub use config::Config;
pub use engine::MetricsEngine;
pub use error::{Error, Result};
pub use types::*;

// Public modules
pub mod analytics;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
