//! Inbound adapters: the command line and the health endpoints.

pub mod cli;
pub mod web;
