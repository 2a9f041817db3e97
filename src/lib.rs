//! A small command interpreter that turns a command line into a process pipeline.
//!
//! A line is split on `|` into stages, each stage is split on whitespace, and the
//! `<`, `>` and `>>` operators are pulled out of the argument list as redirections.
//! The stages are then launched as real processes, connected by pipes, and waited
//! for. The built-ins `cd` and `source` run in-process.
//!
//! There is deliberately no quoting, globbing, variable expansion or job control:
//! the interesting part is the pipe topology and the descriptor hand-off.
//!
//! The main entry point is [`Interpreter`]; [`parser`] and [`pipeline`] expose
//! the stages of the translation for callers who want to drive them directly.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod external;
mod interpreter;
pub mod launcher;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod pipeline;
#[cfg(test)]
mod testutil;

/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{EXIT_COMMAND, Interpreter};
