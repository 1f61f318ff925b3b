//! Ranging session management.
//!
//! This module provides the session registry and its supporting types:
//! handles, event kinds, subscription masks, and per-session state records.

mod event;
mod handle;
mod record;
mod registry;

pub use event::{EventKind, EventMask, ALL_EVENT_KINDS};
pub use handle::SessionHandle;
pub use record::SessionRecord;
pub use registry::SessionRegistry;
