//! Per-domain visualization settings: which actions to hide, which action
//! parameters to leave out of the swim lanes, and which custom visualizer
//! to run.

use planviz_protocol::PlanStep;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Source of visualization settings for a plan view.
pub trait PlanVizSettings: Send + Sync {
    /// Whether the step is drawn at all.
    fn should_display(&self, step: &PlanStep) -> bool;

    /// Whether objects bound to `parameter_name` of `action_name` are left
    /// out of their swim lanes (e.g. the `?from` of a `drive`).
    fn should_ignore_action_parameter(&self, action_name: &str, parameter_name: &str) -> bool;

    /// Name of the registered custom visualizer declared for the domain.
    fn custom_visualization(&self) -> Option<&str> {
        None
    }
}

/// JSON document shape of a domain visualization configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainVizConfigurationSchema {
    /// Patterns for actions hidden from the plan visualization, e.g.
    /// `"^prefix_"` or `"suffix$"`.
    #[serde(default)]
    pub exclude_actions: Vec<String>,
    #[serde(default)]
    pub ignore_action_parameters: Vec<ActionParameterPattern>,
    #[serde(default)]
    pub custom_visualization: Option<String>,
}

/// `{ "action": "^move", "parameterPattern": "^(to|from)$" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameterPattern {
    pub action: String,
    pub parameter_pattern: String,
}

/// Settings backed by a [`DomainVizConfigurationSchema`] with its
/// patterns compiled once, case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct DomainVizConfiguration {
    exclude_actions: Vec<Regex>,
    ignore_action_parameters: Vec<(Regex, Regex)>,
    custom_visualization: Option<String>,
}

impl DomainVizConfiguration {
    pub fn from_schema(schema: &DomainVizConfigurationSchema) -> Result<Self, ConfigError> {
        let exclude_actions = schema
            .exclude_actions
            .iter()
            .map(|p| compile(p))
            .collect::<Result<_, _>>()?;
        let ignore_action_parameters = schema
            .ignore_action_parameters
            .iter()
            .map(|entry| Ok((compile(&entry.action)?, compile(&entry.parameter_pattern)?)))
            .collect::<Result<_, ConfigError>>()?;
        Ok(Self {
            exclude_actions,
            ignore_action_parameters,
            custom_visualization: schema.custom_visualization.clone(),
        })
    }

    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let schema: DomainVizConfigurationSchema = serde_json::from_slice(data)?;
        Self::from_schema(&schema)
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

impl PlanVizSettings for DomainVizConfiguration {
    fn should_display(&self, step: &PlanStep) -> bool {
        !self
            .exclude_actions
            .iter()
            .any(|pattern| pattern.is_match(&step.action_name))
    }

    fn should_ignore_action_parameter(&self, action_name: &str, parameter_name: &str) -> bool {
        // Only the first entry whose action pattern matches applies.
        self.ignore_action_parameters
            .iter()
            .find(|(action, _)| action.is_match(action_name))
            .is_some_and(|(_, parameter)| parameter.is_match(parameter_name))
    }

    fn custom_visualization(&self) -> Option<&str> {
        self.custom_visualization.as_deref()
    }
}
