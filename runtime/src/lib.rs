//! Kaveri hierarchy scraper.
//!
//! Pulls the district → taluka → hobli → village hierarchy from the Kaveri
//! API one request at a time, flattens it into a village reverse mapping,
//! and rewrites the five output files, reporting whether their content
//! changed since the previous run.

pub mod acquisition;
pub mod cartography;
pub mod cli;
pub mod config;
pub mod map;
pub mod pipeline;
pub mod store;
pub mod trust;

pub use config::Config;
pub use pipeline::{Outcome, Pipeline, RunReport};
