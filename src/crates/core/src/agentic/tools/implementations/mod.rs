//! Built-in tools
//!
//! A small first-party set exercised by the server and tests; deployments
//! register their own tools alongside these.

mod clock_tool;
mod memory_tool;
mod reminder_tool;

pub use clock_tool::ClockTool;
pub use memory_tool::RecallMemoryTool;
pub use reminder_tool::{CancelReminderTool, CreateReminderTool, ListRemindersTool, ReminderStore};
