//! Web API module for Autodiag
//!
//! Provides REST API endpoints for:
//! - Diagnostic plan generation
//! - Output schema discovery
//! - Health checks

pub mod diagnose;
pub mod error;
pub mod health;

pub use diagnose::diagnose_routes;
pub use error::ApiError;
pub use health::health_routes;
