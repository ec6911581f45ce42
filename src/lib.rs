//! # Bootplane
//!
//! Bootplane renders the bootstrap configuration a managed Envoy proxy reads
//! at startup, before it can reach the discovery service. The telemetry
//! section of a proxy policy (Prometheus toggle, metric sinks, stats
//! visibility overrides) goes in; a complete, deterministic YAML document
//! comes out. Everything else in the document is fixed infrastructure
//! wiring: admin interface, readiness listener, mTLS discovery cluster and
//! the dynamic runtime layer.
//!
//! ## Example Usage
//!
//! ```rust
//! use bootplane::{render_bootstrap_config, Result};
//!
//! fn main() -> Result<()> {
//!     let bootstrap = render_bootstrap_config(None)?;
//!     assert!(bootstrap.contains("xds_cluster"));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;

// Re-export commonly used types
pub use api::ProxyMetrics;
pub use bootstrap::{render_bootstrap_config, BootstrapParameters};
pub use config::Config;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
