//! # api-adapters
//!
//! Everything between HTTP and the services: the markdown formatter, the
//! askama views, Prometheus counters and, behind `web-axum`, the router.

pub mod markdown;
pub mod metrics;
pub mod views;

#[cfg(feature = "web-axum")]
pub mod http;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use http::{router, AppState};
