//! subgraph-probe - A command-line workbench for debugging GraphQL
//! subgraph endpoints.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod persistence;
pub mod proxy;
pub mod query;
pub mod template;
pub mod transport;
pub mod validation;
