//! # Shell Module
//!
//! Entry point and CLI logic for the `shell_gate` binary: argument parsing, the one-shot
//! `run`/`check`/`defaults` modes and the line-delimited `serve` mode.

pub mod cli;
pub mod modes;
pub mod response;

pub use cli::{Cli, Mode, build_gate, run};
pub use response::{Response, ServeRequest};
