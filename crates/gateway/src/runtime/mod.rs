//! Call-flow runtime: digit collection, charge orchestration, transaction
//! persistence, and outcome delivery.

pub mod digits;
pub mod flow;
pub mod payment;
pub mod transactions;
pub mod webhook;
