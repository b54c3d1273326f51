//! Domain routing types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain_tag::LegalDomain;
use super::language_model::StructuredOutput;

/// One selection made by the router model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSelection {
    pub tool: String,
}

/// Router model output: one or more tool selections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSelection {
    pub tools: Vec<ToolSelection>,
}

impl RouteSelection {
    /// Selected domains as a set (duplicates collapse)
    ///
    /// Only meaningful after [`StructuredOutput::validate`] succeeded.
    pub fn domains(&self) -> BTreeSet<LegalDomain> {
        self.tools
            .iter()
            .filter_map(|selection| LegalDomain::from_route_label(&selection.tool))
            .collect()
    }
}

impl StructuredOutput for RouteSelection {
    const SCHEMA_NAME: &'static str = "route_selection";

    fn json_schema() -> serde_json::Value {
        let labels: Vec<&str> = LegalDomain::ALL.iter().map(|d| d.route_label()).collect();

        serde_json::json!({
            "type": "object",
            "properties": {
                "tools": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "tool": { "type": "string", "enum": labels }
                        },
                        "required": ["tool"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["tools"],
            "additionalProperties": false
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.tools.is_empty() {
            return Err("at least one tool must be selected".to_string());
        }

        if let Some(unknown) = self
            .tools
            .iter()
            .find(|selection| LegalDomain::from_route_label(&selection.tool).is_none())
        {
            return Err(format!("unknown tool '{}'", unknown.tool));
        }

        Ok(())
    }
}
