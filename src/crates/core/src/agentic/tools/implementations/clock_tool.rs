use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use aria_agent_tools::{Tool, ToolError, ToolOutput, ToolUseContext};

/// Current date and time, optionally in a named timezone.
pub struct ClockTool;

impl ClockTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClockTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }

    fn description(&self) -> String {
        "Get the current date and time, optionally in a specific timezone".to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "IANA timezone name, e.g. Europe/Paris; defaults to UTC"
                }
            },
            "additionalProperties": false
        })
    }

    fn aliases(&self) -> Vec<String> {
        vec!["time".to_string(), "datetime".to_string()]
    }

    fn timeout_ms(&self) -> Option<u64> {
        Some(2_000)
    }

    async fn execute(
        &self,
        input: &Value,
        _context: &ToolUseContext,
    ) -> Result<ToolOutput, ToolError> {
        let now = Utc::now();
        let timezone = input.get("timezone").and_then(|v| v.as_str());

        let (formatted, zone_label) = match timezone {
            Some(name) => {
                let Ok(tz) = name.parse::<chrono_tz::Tz>() else {
                    // Completed, but the request itself was off.
                    return Ok(ToolOutput::failed(format!("Unknown timezone: {}", name)));
                };
                (
                    now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z").to_string(),
                    name.to_string(),
                )
            }
            None => (now.format("%Y-%m-%d %H:%M:%S UTC").to_string(), "UTC".to_string()),
        };

        Ok(ToolOutput::structured(
            format!("It is {}", formatted),
            json!({
                "iso": now.to_rfc3339(),
                "timezone": zone_label,
                "formatted": formatted,
            }),
        ))
    }
}
