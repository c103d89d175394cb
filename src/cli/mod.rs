//! CLI module: a thin `clap`-derive shell exercising the core pipeline
//! end to end. Argument parsing lives in `args`, command handlers in
//! `commands`, and pipeline wiring in `setup`.

pub mod args;
pub mod commands;
pub mod setup;

pub use args::{parse_args, Cli, Commands};
pub use commands::{
    handle_audit_command, handle_clean_command, handle_scan_command, handle_trace_command,
    EXIT_CRITICAL,
};
pub use setup::{build_pipeline, resolve_home, Pipeline};
