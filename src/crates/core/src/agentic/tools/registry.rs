use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::util::errors::{AriaError, AriaResult};
use aria_agent_tools::Tool;
use aria_core_types::ArgumentViolation;

/// A registered tool with its compiled argument validator. The schema is
/// compiled once at registration so per-call validation is cheap.
pub struct RegisteredTool {
    pub tool: Arc<dyn Tool>,
    pub schema: Value,
    validator: jsonschema::Validator,
}

impl RegisteredTool {
    /// Validate arguments against the tool schema, returning the full
    /// structured violation list (empty when valid).
    pub fn validate_args(&self, args: &Value) -> Vec<ArgumentViolation> {
        self.validator
            .iter_errors(args)
            .map(|error| ArgumentViolation {
                path: error.instance_path.to_string(),
                rule: error
                    .schema_path
                    .to_string()
                    .rsplit('/')
                    .next()
                    .unwrap_or("schema")
                    .to_string(),
                message: error.to_string(),
            })
            .collect()
    }

    /// Names of required top-level arguments per the schema.
    pub fn required_args(&self) -> Vec<String> {
        self.schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Immutable tool registry, dependency-injected into the orchestration
/// entry point. Registered once at startup; hot-reload is out of scope.
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
    aliases: HashMap<String, String>,
    catalog_text: String,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Resolve a direct name or an alias.
    pub fn resolve(&self, name_or_alias: &str) -> Option<&RegisteredTool> {
        if let Some(entry) = self.tools.get(name_or_alias) {
            return Some(entry);
        }
        self.aliases
            .get(name_or_alias)
            .and_then(|name| self.tools.get(name))
    }

    pub fn contains(&self, name_or_alias: &str) -> bool {
        self.resolve(name_or_alias).is_some()
    }

    /// Flat text block describing every tool, for planner prompts. Built
    /// once at registry construction.
    pub fn catalog_text(&self) -> &str {
        &self.catalog_text
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: IndexMap<String, RegisteredTool>,
    aliases: HashMap<String, String>,
}

impl ToolRegistryBuilder {
    pub fn register(mut self, tool: Arc<dyn Tool>) -> AriaResult<Self> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) || self.aliases.contains_key(&name) {
            return Err(AriaError::Validation(format!(
                "duplicate tool name '{}'",
                name
            )));
        }

        let schema = tool.input_schema();
        let validator = jsonschema::validator_for(&schema).map_err(|e| {
            AriaError::internal(format!("tool '{}' schema does not compile: {}", name, e))
        })?;

        for alias in tool.aliases() {
            if self.tools.contains_key(&alias) || self.aliases.contains_key(&alias) {
                return Err(AriaError::Validation(format!(
                    "duplicate tool alias '{}'",
                    alias
                )));
            }
            self.aliases.insert(alias, name.clone());
        }

        self.tools.insert(
            name,
            RegisteredTool {
                tool,
                schema,
                validator,
            },
        );
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        let catalog_text = build_catalog_text(&self.tools);
        ToolRegistry {
            tools: self.tools,
            aliases: self.aliases,
            catalog_text,
        }
    }
}

fn build_catalog_text(tools: &IndexMap<String, RegisteredTool>) -> String {
    let mut out = String::new();
    for (name, entry) in tools {
        if !entry.tool.enabled() {
            continue;
        }
        out.push_str(&format!("- {}: {}\n", name, entry.tool.description()));

        let required = entry.required_args();
        let properties = entry
            .schema
            .get("properties")
            .and_then(|p| p.as_object());
        let Some(properties) = properties else {
            continue;
        };

        let describe = |key: &str, value: &Value| -> String {
            let arg_type = value.get("type").and_then(|t| t.as_str()).unwrap_or("any");
            format!("{} ({})", key, arg_type)
        };

        let required_list: Vec<String> = properties
            .iter()
            .filter(|(key, _)| required.contains(key))
            .map(|(key, value)| describe(key, value))
            .collect();
        let optional_list: Vec<String> = properties
            .iter()
            .filter(|(key, _)| !required.contains(key))
            .map(|(key, value)| describe(key, value))
            .collect();

        if !required_list.is_empty() {
            out.push_str(&format!("    required: {}\n", required_list.join(", ")));
        }
        if !optional_list.is_empty() {
            out.push_str(&format!("    optional: {}\n", optional_list.join(", ")));
        }
    }
    out
}
