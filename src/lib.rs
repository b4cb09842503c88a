//! Psychology session state and scoring engine.
//!
//! Turns self-reported mental-state vectors into derived brainwave bands, a
//! consciousness score, and an emotional label; scores cognitive test
//! submissions; tracks session lifecycles; and aggregates the stored history
//! into time-windowed reports. Transport (HTTP, UI) lives elsewhere and
//! talks to [`Engine`].

pub mod analytics;
pub mod db;
pub mod derive;
pub mod engine;
pub mod error;
pub mod models;
pub mod scoring;

pub use analytics::{AggregateReport, AnalyticsWindow};
pub use db::Database;
pub use engine::{Engine, NewSession};
pub use error::{EngineError, EngineResult};
