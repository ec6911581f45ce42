//! # Observability Infrastructure
//!
//! Logging setup for the bootplane binary. Rendering itself emits only
//! debug-level breadcrumbs; log output never feeds into the rendered
//! document bytes.

pub mod logging;

pub use logging::init_logging;
