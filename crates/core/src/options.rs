use serde::{Deserialize, Serialize};

/// Display options for one plan view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanViewOptions {
    /// Duration substituted for instantaneous steps.
    pub epsilon: f64,
    /// Width in pixels the plan's makespan is fitted into (labels next to
    /// the bars may extend past it).
    pub display_width: f64,
    #[serde(default)]
    pub disable_swimlanes: bool,
    #[serde(default)]
    pub disable_line_plots: bool,
    /// No action links: the output is not attached to a domain editor.
    #[serde(default)]
    pub self_contained: bool,
    #[serde(default = "default_plan_step_height")]
    pub plan_step_height: f64,
}

fn default_plan_step_height() -> f64 {
    20.0
}

impl PlanViewOptions {
    pub fn new(display_width: f64, epsilon: f64) -> Self {
        Self {
            epsilon,
            display_width,
            disable_swimlanes: false,
            disable_line_plots: false,
            self_contained: false,
            plan_step_height: default_plan_step_height(),
        }
    }
}

impl Default for PlanViewOptions {
    fn default() -> Self {
        Self::new(400.0, 1e-3)
    }
}
