pub use crate::error::{Error, PbResult};
pub use crate::types::{Patch, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
