//! tempovi - edit Tempo worklogs as plain text
//!
//! This crate provides the core functionality for the `tempovi` CLI tool:
//! worklogs of a date range are rendered as text, edited in an external
//! editor, parsed back, reconciled against the fetched state, and synced as
//! a minimal set of create, update, and delete calls.
//!
//! # Architecture
//!
//! - [`model`] - Entry, worklog ids, date ranges, `H:MM:SS` durations
//! - [`codec`] - Text encoding and decoding of worklogs
//! - [`sync`] - Reconciler, change plans, executor, remote port
//! - [`tempo`] - HTTP implementation of the remote port
//! - [`editor`] - Scoped external editor session
//! - [`config`] - Configuration file and settings resolution
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod model;
pub mod sync;
pub mod tempo;

pub use error::{Error, Result};
