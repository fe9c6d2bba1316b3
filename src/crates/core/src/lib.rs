// Aria Core Library - orchestration and intent-resolution pipeline
// Three-layer architecture: Util -> Infrastructure -> Agentic

pub mod agentic; // Agentic layer - disambiguation, classifier chain, planning, tool execution
pub mod config;
pub mod infrastructure; // Infrastructure layer - completion client, memory search
pub mod util; // Utility layer - errors, text helpers

// Export main types
pub use config::OrchestratorConfig;
pub use util::errors::{AriaError, AriaResult};

// Export infrastructure components
pub use infrastructure::completion::{CompletionClient, CompletionRequest, HttpCompletionClient};
pub use infrastructure::memory::{InMemoryMemoryIndex, MemorySearch, SearchOptions};

// Export agentic components
pub use agentic::{
    classify::{ClassifierChain, Detector, DetectorOutcome},
    disambiguation::Disambiguator,
    orchestrator::{Orchestrator, TurnOutcome, TurnRequest},
    planning::{ExecutionPlan, ExecutionStep, Plan, PlanKind, PlannerSet},
    tools::{BatchToolCall, ToolExecutor, ToolRegistry},
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "Aria Core";
