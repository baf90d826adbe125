//! Server module for Autodiag
//!
//! - `config`: configuration structures
//! - `loader`: configuration loading from files and environment
//! - `init`: handler construction, router assembly and the run loop

pub mod config;
mod init;
mod loader;

pub use config::AppConfig;
pub use init::{build_handler, build_router, run};
pub use loader::load_config;
