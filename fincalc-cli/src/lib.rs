//! Command-line front end for the calculation engine.

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod input;
