//! Prefvault service layer
//!
//! Wires a [`PrefAdapter`](prefvault::pref_adapter::PrefAdapter) to the
//! [`PreferenceService`](service::PreferenceService), which resolves the
//! settings kind or consent type of each request and applies the configured
//! defaults when settings rows are created lazily.

pub mod app;
pub mod config;
pub mod logging;
pub mod prelude;
pub mod service;

pub use prefvault::{consent, error, pref_adapter, settings, types};

// vim: ts=4
