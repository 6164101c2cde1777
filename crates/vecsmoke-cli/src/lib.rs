//! vecsmoke command-line library.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (run, check, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, EndpointArgs, RunArgs};
pub use commands::{
    check_collection, describe_error, handle_check, handle_run, init_logging, load_settings,
    render_probe, render_report, run_smoke_test, show_config,
};
