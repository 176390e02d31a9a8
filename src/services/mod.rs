pub mod client;
pub mod clocks;
pub mod generator;
pub mod metrics;
