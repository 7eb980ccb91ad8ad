//! Shared types, adapter trait, and core utilities for Prefvault.
//!
//! This crate contains the types that are shared between the service crate
//! and the storage adapter implementations. Keeping them here lets adapter
//! crates depend on the contract without pulling in the service.

pub mod consent;
pub mod error;
pub mod pref_adapter;
pub mod prelude;
pub mod settings;
pub mod types;

// vim: ts=4
