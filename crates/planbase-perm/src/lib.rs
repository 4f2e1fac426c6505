//! Permission subsystem. Answers "may this member do that on this module",
//! owns the member's permission rows and manages module view configuration.

pub mod cache;
pub mod defaults;
pub mod resolver;
pub mod view;

mod prelude;

pub use cache::PermissionCache;
pub use defaults::{default_actions, default_permissions};
pub use resolver::{PermissionMatrix, PermissionResolver};

// vim: ts=4
