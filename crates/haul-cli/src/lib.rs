//! The `haul` command-line downloader
//!
//! Wires the input-file parser, the configuration store and the dispatcher
//! to concrete URL handlers and jobs.

pub mod cli;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod jobs;
pub mod logging;
