//! Tool system
//!
//! The registry is an explicitly constructed, immutable mapping of tool
//! name to handler + schema; the executor validates, times out and
//! normalizes every invocation.

pub mod executor;
pub mod implementations;
pub mod registry;

pub use executor::{BatchToolCall, PlanRunReport, StepRecord, ToolExecutor};
pub use registry::{RegisteredTool, ToolRegistry, ToolRegistryBuilder};
