//! cvmtrack - CVM public-offering tracker.
//!
//! Ingests the regulator's bulk registry feed, scrapes each offering's
//! Angular-rendered detail page for per-series terms, reconciles both with
//! an optional settlement reference feed, and maintains a canonical
//! semicolon-CSV tracking table that analysts edit between runs.

pub mod changes;
pub mod cli;
pub mod config;
pub mod feeds;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod scrape;
