//! Card-processor adapters.
//!
//! The gateway only ever talks to the [`CardProcessor`] trait. Bootstrap
//! selects the implementation once (the live Stripe adapter or the mock
//! test double), so business logic never branches on configuration.

pub mod mock;
pub mod stripe;
pub mod traits;

pub use mock::MockProcessor;
pub use stripe::StripeProcessor;
pub use traits::{CardDetails, CardProcessor, IntentRequest, IntentStatus};
