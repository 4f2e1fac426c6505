//! Planbase core
//!
//! Two services shared by the Planbase API:
//!
//! - permission resolution: role defaults, per-member permission rows, module
//!   views and role view templates
//! - configuration resolution: compiled-in defaults, the external registry and
//!   SYSTEM/ACCOUNT/USER/PROJECT overrides, merged in that order

// Re-export shared types and the adapter trait from planbase-types
pub use planbase_types::config_types;
pub use planbase_types::error;
pub use planbase_types::meta_adapter;
pub use planbase_types::rbac;
pub use planbase_types::types;

// Subsystem re-exports
pub use planbase_config as config;
pub use planbase_meta_adapter_sqlite as meta_adapter_sqlite;
pub use planbase_perm as perm;

// Local modules
pub mod app;
pub mod logging;
pub mod prelude;

pub use app::{App, AppBuilder, AppBuilderOpts, AppState, VERSION};

// vim: ts=4
