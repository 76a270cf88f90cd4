//! Netmedic Common - network diagnosis and repair engine
//!
//! Probes inspect the host's network stack, repairs change it, and the
//! orchestrators run either set in order with cooperative cancellation.
//! Console output from legacy utilities is GBK-decoded and parsed in `parsers`.

pub mod command_exec;
pub mod config;
pub mod context;
pub mod error;
pub mod interfaces;
pub mod orchestrator;
pub mod parsers;
pub mod privilege;
pub mod probe;
pub mod proxy_store;
pub mod reachability;
pub mod repair;
pub mod report;
pub mod tools;
pub mod types;

pub use command_exec::{CommandFailure, CommandResult, CommandRunner, CommandSpec};
pub use config::NetmedicConfig;
pub use context::SystemContext;
pub use error::{NetmedicError, Result};
pub use orchestrator::{DiagnosticEngine, Orchestrator, RepairEngine};
pub use report::{DiagnosticReport, RepairReport, SystemInfo};
pub use types::*;
