use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Value};

use aria_agent_tools::{Tool, ToolError, ToolOutput, ToolUseContext};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// In-memory reminder store keyed by user id. Tool-internal state, not
/// pipeline state; a deployment swaps this for its own persistence by
/// registering different reminder tools.
#[derive(Default)]
pub struct ReminderStore {
    reminders: DashMap<String, Vec<Reminder>>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user_id: &str, text: String, when: Option<String>) -> Reminder {
        let reminder = Reminder {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            when,
            created_at: Utc::now(),
        };
        self.reminders
            .entry(user_id.to_string())
            .or_default()
            .push(reminder.clone());
        reminder
    }

    pub fn list(&self, user_id: &str) -> Vec<Reminder> {
        self.reminders
            .get(user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Remove the first reminder whose text contains `query`
    /// (case-insensitive). Returns the removed reminder if any.
    pub fn cancel_matching(&self, user_id: &str, query: &str) -> Option<Reminder> {
        let query = query.to_lowercase();
        let mut entry = self.reminders.get_mut(user_id)?;
        let index = entry
            .iter()
            .position(|r| r.text.to_lowercase().contains(&query))?;
        Some(entry.remove(index))
    }
}

pub struct CreateReminderTool {
    store: Arc<ReminderStore>,
}

impl CreateReminderTool {
    pub fn new(store: Arc<ReminderStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateReminderTool {
    fn name(&self) -> &str {
        "create_reminder"
    }

    fn description(&self) -> String {
        "Create a reminder for the user".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "minLength": 1,
                    "description": "What to remind the user about"
                },
                "when": {
                    "type": "string",
                    "description": "Natural-language time, e.g. 'tomorrow 3pm'"
                }
            },
            "required": ["text"],
            "additionalProperties": false
        })
    }

    fn aliases(&self) -> Vec<String> {
        vec!["remind".to_string(), "set_reminder".to_string()]
    }

    async fn execute(
        &self,
        input: &Value,
        context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        let text = input
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::new("text is required"))?;
        let when = input
            .get("when")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let reminder = self.store.add(&context.user_id, text.to_string(), when);
        let message = match &reminder.when {
            Some(when) => format!("Reminder set for {}: {}", when, reminder.text),
            None => format!("Reminder set: {}", reminder.text),
        };

        let data = serde_json::to_value(&reminder)
            .map_err(|e| ToolError::new(format!("reminder did not serialize: {}", e)))?;
        Ok(ToolOutput::structured(message, data))
    }
}

pub struct ListRemindersTool {
    store: Arc<ReminderStore>,
}

impl ListRemindersTool {
    pub fn new(store: Arc<ReminderStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListRemindersTool {
    fn name(&self) -> &str {
        "list_reminders"
    }

    fn description(&self) -> String {
        "List the user's reminders".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        })
    }

    fn aliases(&self) -> Vec<String> {
        vec!["reminders".to_string()]
    }

    async fn execute(
        &self,
        _input: &Value,
        context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        let reminders = self.store.list(&context.user_id);
        let message = if reminders.is_empty() {
            "You have no reminders.".to_string()
        } else {
            format!("You have {} reminder(s).", reminders.len())
        };

        let data = serde_json::to_value(&reminders)
            .map_err(|e| ToolError::new(format!("reminders did not serialize: {}", e)))?;
        Ok(ToolOutput::structured(message, json!({ "reminders": data })))
    }
}

pub struct CancelReminderTool {
    store: Arc<ReminderStore>,
}

impl CancelReminderTool {
    pub fn new(store: Arc<ReminderStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CancelReminderTool {
    fn name(&self) -> &str {
        "cancel_reminder"
    }

    fn description(&self) -> String {
        "Cancel a reminder matching a text query".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Text identifying the reminder to cancel"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    fn aliases(&self) -> Vec<String> {
        vec!["delete_reminder".to_string()]
    }

    async fn execute(
        &self,
        input: &Value,
        context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::new("query is required"))?;

        match self.store.cancel_matching(&context.user_id, query) {
            Some(reminder) => {
                let data = serde_json::to_value(&reminder)
                    .map_err(|e| ToolError::new(format!("reminder did not serialize: {}", e)))?;
                Ok(ToolOutput::structured(
                    format!("Cancelled reminder: {}", reminder.text),
                    data,
                ))
            }
            None => Ok(ToolOutput::failed(format!(
                "No reminder matching '{}' was found.",
                query
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_matching_is_case_insensitive_and_removes_one() {
        let store = ReminderStore::new();
        store.add("u1", "Call the Dentist at 3pm".to_string(), None);
        store.add("u1", "water the plants".to_string(), None);

        let removed = store.cancel_matching("u1", "dentist").unwrap();
        assert!(removed.text.contains("Dentist"));
        assert_eq!(store.list("u1").len(), 1);
        assert!(store.cancel_matching("u1", "dentist").is_none());
    }
}
