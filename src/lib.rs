//! Autodiag - Bilingual Automotive Diagnostic Plans
//!
//! HTTP and CLI surface over `autodiag-core`.

#![forbid(unsafe_code)]

pub mod api;
pub mod cli;
pub mod server;
