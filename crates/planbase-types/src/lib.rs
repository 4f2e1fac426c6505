//! Shared types, adapter traits, and core utilities for the Planbase core.
//!
//! This crate contains the foundational types that are shared between the
//! resolver crates and the persistence adapter implementations. Keeping them
//! here lets the adapters compile without pulling in resolver logic.

#![forbid(unsafe_code)]

pub mod config_types;
pub mod error;
pub mod meta_adapter;
pub mod prelude;
pub mod rbac;
pub mod types;

// vim: ts=4
