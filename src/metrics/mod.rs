//! Metrics and monitoring for the commons-arena service

pub mod collector;

pub use collector::MetricsCollector;
