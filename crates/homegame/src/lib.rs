//! # homegame
//!
//! HTTP API and configuration for the homegame tracker. The `homegame`
//! binary wraps these with a CLI.

pub mod api;
pub mod config;
pub mod server;
