pub use planbase_types::config_types::ConfigScope;
pub use planbase_types::prelude::*;

pub use crate::keys::ConfigMap;

// vim: ts=4
