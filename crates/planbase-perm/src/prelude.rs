pub use planbase_types::prelude::*;
pub use planbase_types::rbac::{Action, Module, Role};

// vim: ts=4
