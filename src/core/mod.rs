pub mod best_match;
pub mod buffer;
pub mod config;
pub mod distance_metric;
pub mod query;
pub mod stats;
