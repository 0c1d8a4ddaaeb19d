//! In-flight call session state.
//!
//! One [`CallSession`] exists per active IVR payment dialog, keyed by the
//! telephony provider's call identifier. Sessions live purely in memory:
//! they are created when a payment intent is set up, mutated by the digit
//! processor, and deleted exactly once at a terminal outcome.

mod lock;
mod store;

pub use lock::{CallBusy, CallLockMap};
pub use store::{CallSession, GatherStep, SessionCreate, SessionStore, SessionUpdate};
