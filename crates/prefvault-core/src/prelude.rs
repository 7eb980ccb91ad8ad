pub use prefvault::prelude::*;

pub use crate::app::{App, AppBuilder, AppState};
pub use crate::service::PreferenceService;

// vim: ts=4
