//! # CLI Module
//!
//! The `monorail` command line.
//!
//! ## Commands
//!
//! ### `select`
//!
//! Load controllers from a YAML manifest (see [`crate::manifest`]), build the
//! default handler factory and report which handler variant a request for
//! `area/controller/action` gets:
//!
//! ```bash
//! monorail select --manifest controllers.yaml --controller home --action index
//! monorail select -m controllers.yaml --area api --controller feed --action refresh --execute
//! ```
//!
//! ### `mail`
//!
//! Render a mail template and print the parsed message:
//!
//! ```bash
//! monorail mail --views ./views --template welcome --params '{"name": "Jane"}'
//! ```
//!
//! Both commands read `--config <FILE>` (or `MONORAIL_CONFIG`) for view,
//! descriptor-cache and stack-size settings.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
