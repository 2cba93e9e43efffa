// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs external programs with `std::process::Command`, captures stdout and
//! stderr, and optionally tees them live into caller-supplied sinks.
//!
//! - [`invocation`] describes what to run and the naive command-line split.
//! - [`sink`] provides the boxed sink type and the discard sink.
//! - [`tee`] duplicates each captured chunk into a buffer and a sink, on
//!   per-channel capture worker threads.
//! - [`forked`] holds the deferred wait handles returned by `fork*`.
//! - [`runner`] ties it together in [`Runner`].

pub mod forked;
pub mod invocation;
pub mod runner;
pub mod sink;
pub mod tee;

pub use forked::{Forked, ForkedSplit};
pub use invocation::{Invocation, split_command_line};
pub use runner::Runner;
pub use sink::{BoxSink, discard};
pub use tee::Tee;
