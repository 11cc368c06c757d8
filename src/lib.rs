//! Employee portal data layer: talks to the hosted backend and turns its
//! change feed into notifications.

pub mod backend;
pub mod processor;

pub use backend::{BackendClient, BackendError, PortalBackend};
pub use processor::{ChangeTable, EventOutcome, ShiftEventProcessor, SkipReason};
