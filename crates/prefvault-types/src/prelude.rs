pub use crate::error::{Error, PvResult};
pub use crate::types::{Patch, Timestamp, UserId};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
