//! updown-edge: momentum edge detector for Polymarket crypto up/down rounds
//!
//! This library provides the core components for:
//! - Real-time trade prices from Binance into a bounded price window
//! - Round window arithmetic for fixed-duration rounds
//! - Cached, fail-open round quotes from the Gamma API
//! - A linear momentum probability model
//! - Edge evaluation and trade proposals
//! - A cooldown-gated decision loop with paper execution
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod execution;
pub mod feed;
pub mod model;
pub mod momentum;
pub mod quote;
pub mod round;
pub mod scheduler;
pub mod telemetry;
pub mod ws;
