#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for slapd-stats
//!
//! This library holds all functionality of the slapd-stats tool, which turns
//! the monitor entries of an OpenLDAP server into tagged metrics.
//!
//! # Module Organization
//!
//! - [`tree`]: The declarative monitoring tree
//! - [`compile`]: Compilation of the tree into statistic definitions
//! - [`directory`]: Access to the directory being monitored
//! - [`stats`]: Collection cycles, measurements, and the poll loop
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod commands;
pub mod compile;
pub mod directory;
pub mod stats;
pub mod tree;

pub use crate::commands::{Host, run};
