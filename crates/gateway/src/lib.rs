//! Vortex gateway — collects card details from a live caller over DTMF and
//! charges them through the card processor, notifying the agent of the
//! outcome via a signed webhook.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
pub mod twiml;

#[cfg(test)]
pub(crate) mod testutil;
