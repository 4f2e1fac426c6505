//! Configuration subsystem. Resolves the effective configuration of an
//! account/user/project context from compiled-in defaults, the external
//! registry and the scoped overrides stored in the database.

pub mod cache;
pub mod keys;
pub mod merge;
pub mod registry;
pub mod resolver;

mod prelude;

pub use cache::{ConfigCache, RegistryCache};
pub use keys::{ConfigKeyDef, ConfigMap, ConfigShape, config_keys, default_config};
pub use registry::{RegistrySource, StrapiRegistry};
pub use resolver::{ConfigResolver, ConfigSource, ResolveMeta, ResolvedConfig, SourceInfo};

// vim: ts=4
