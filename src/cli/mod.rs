//! Command-line interface for vimaya.

pub mod args;
pub mod commands;
