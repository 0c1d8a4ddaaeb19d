//! Shared types for the Vortex IVR payment gateway: configuration,
//! the common error enum, and the persisted transaction model.

pub mod config;
pub mod error;
pub mod transaction;
