//! Infrastructure layer.
//!
//! Configuration loading and the composition root that wires storage,
//! services and adapters together.
//!
//! - [`bootstrap`] - Runtime wiring
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
