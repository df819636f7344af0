pub mod aggregators;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
