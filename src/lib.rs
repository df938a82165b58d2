//! Marshal bot library.
//!
//! Exposes the grid model, territory intelligence, objective queue, path
//! search, move selection, and protocol modules for use by integration
//! tests and the binary entry points.

pub mod board;
pub mod config;
pub mod engine;
pub mod intel;
pub mod movegen;
pub mod objective;
pub mod protocol;
pub mod search;
pub mod selfplay;
