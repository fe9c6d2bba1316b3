//! Turn orchestration
//!
//! Entry point for one user turn: disambiguate, run the classifier chain,
//! and hand back either an execution plan or the resolved query for
//! ordinary single-tool handling.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::agentic::classify::ClassifierChain;
use crate::agentic::context::TurnContext;
use crate::agentic::disambiguation::Disambiguator;
use crate::agentic::planning::{ExecutionPlan, Plan, PlanKind, PlannerSet};
use crate::agentic::tools::{ToolExecutor, ToolRegistry};
use crate::config::OrchestratorConfig;
use crate::infrastructure::completion::CompletionClient;
use crate::infrastructure::memory::MemorySearch;
use crate::util::errors::AriaResult;
use aria_core_types::{ConversationTurn, DisambiguationResult, UserProfile};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// A detector claimed the turn; the plan is ready for the executor.
    #[serde(rename_all = "camelCase")]
    Planned {
        kind: PlanKind,
        plan: Plan,
        execution_plan: ExecutionPlan,
    },
    /// No detector claimed the turn; downstream handles the resolved query
    /// as an ordinary single-tool-or-no-tool request.
    #[serde(rename_all = "camelCase")]
    Passthrough {
        resolved_query: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        disambiguation: Option<DisambiguationResult>,
    },
}

/// Holds the long-lived, read-only collaborators. No mutable state survives
/// a turn; everything per-turn lives in the `TurnContext` and is dropped
/// when `handle_turn` returns.
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    completion: Arc<dyn CompletionClient>,
    memory: Arc<dyn MemorySearch>,
    config: Arc<OrchestratorConfig>,
    planner: Arc<PlannerSet>,
    chain: ClassifierChain,
    disambiguator: Disambiguator,
    executor: ToolExecutor,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<ToolRegistry>,
        completion: Arc<dyn CompletionClient>,
        memory: Arc<dyn MemorySearch>,
        config: OrchestratorConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            disambiguator: Disambiguator::new(completion.clone(), config.clone()),
            executor: ToolExecutor::new(registry.clone(), config.clone()),
            chain: ClassifierChain::standard(),
            planner: Arc::new(PlannerSet::new()),
            registry,
            completion,
            memory,
            config,
        }
    }

    /// Swap in a custom detector chain (testing, trimmed deployments).
    pub fn with_chain(mut self, chain: ClassifierChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Arc<OrchestratorConfig> {
        &self.config
    }

    pub async fn handle_turn(&self, request: TurnRequest) -> AriaResult<TurnOutcome> {
        let user_id = request
            .user_id
            .unwrap_or_else(|| "anonymous".to_string());
        let session_id = request
            .session_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let disambiguation = self
            .disambiguator
            .disambiguate(&request.query, &request.history, request.profile.as_ref())
            .await;
        let resolved_query = disambiguation
            .as_ref()
            .map(|d| d.canonical_query().to_string())
            .unwrap_or_else(|| request.query.clone());

        let ctx = TurnContext::assemble(
            user_id,
            session_id,
            &request.history,
            request.profile.as_ref(),
            self.registry.clone(),
            self.completion.clone(),
            self.memory.clone(),
            self.planner.clone(),
            self.config.clone(),
        );

        if let Some((kind, plan)) = self.chain.classify(&resolved_query, &ctx).await {
            let execution_plan = plan.to_execution_steps();
            return Ok(TurnOutcome::Planned {
                kind,
                plan,
                execution_plan,
            });
        }

        debug!("No detector claimed the turn; passing resolved query through");
        Ok(TurnOutcome::Passthrough {
            resolved_query,
            disambiguation,
        })
    }
}
