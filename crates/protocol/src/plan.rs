use serde::{Deserialize, Serialize};

use crate::domain::{DomainInfo, ProblemInfo};

/// Whether a step's start/end boundaries are already fixed relative to the
/// plan's "now" cursor or still part of the speculative (relaxed) plan.
///
/// Tags the planner emits but this crate does not know decode as
/// [`PlanStepCommitment::Unrecognized`] instead of failing the whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanStepCommitment {
    Committed,
    EndsInRelaxedPlan,
    StartsInRelaxedPlan,
    #[serde(other)]
    Unrecognized,
}

/// One timed action of a computed plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    pub start_time: f64,
    pub action_name: String,
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub is_durative: bool,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub commitment: Option<PlanStepCommitment>,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_iterations() -> u32 {
    1
}

impl PlanStep {
    /// Build a step from a full action expression such as
    /// `"drive-truck truck1 s0 s2 driver1"`.
    pub fn new(
        start_time: f64,
        full_action_name: &str,
        is_durative: bool,
        duration: Option<f64>,
    ) -> Self {
        let mut fragments = full_action_name.split_whitespace();
        let action_name = fragments.next().unwrap_or_default().to_string();
        Self {
            start_time,
            action_name,
            objects: fragments.map(str::to_string).collect(),
            is_durative,
            duration,
            commitment: None,
            iterations: 1,
        }
    }

    pub fn with_commitment(mut self, commitment: PlanStepCommitment) -> Self {
        self.commitment = Some(commitment);
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// `start_time + (duration ?? 0)`.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration.unwrap_or(0.0)
    }

    /// Action name followed by the bound objects, space separated.
    pub fn full_action_name(&self) -> String {
        if self.objects.is_empty() {
            self.action_name.clone()
        } else {
            format!("{} {}", self.action_name, self.objects.join(" "))
        }
    }
}

/// Which happening of an action a helpful action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HappeningType {
    Start,
    End,
    Instantaneous,
}

/// An action the planner suggests applying next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulAction {
    pub action_name: String,
    pub kind: HappeningType,
}

/// A computed plan, as handed over by the planning library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub domain: Option<DomainInfo>,
    #[serde(default)]
    pub problem: Option<ProblemInfo>,
    /// Current simulated time; `None` treats the whole plan as committed.
    #[serde(default)]
    pub now: Option<f64>,
    #[serde(default)]
    pub helpful_actions: Vec<HelpfulAction>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub metric: Option<f64>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Latest step end time; 0 for an empty plan.
    pub fn makespan(&self) -> f64 {
        self.steps
            .iter()
            .map(PlanStep::end_time)
            .fold(0.0, f64::max)
    }

    pub fn has_helpful_actions(&self) -> bool {
        !self.helpful_actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_full_action_name() {
        let step = PlanStep::new(1.002, "DRIVE-TRUCK truck1 s0 s2 driver1", true, Some(10.0));
        assert_eq!(step.action_name, "DRIVE-TRUCK");
        assert_eq!(step.objects, ["truck1", "s0", "s2", "driver1"]);
        assert_eq!(step.full_action_name(), "DRIVE-TRUCK truck1 s0 s2 driver1");
        assert!((step.end_time() - 11.002).abs() < 1e-9);
    }

    #[test]
    fn end_time_of_instantaneous_step_is_its_start() {
        let step = PlanStep::new(3.0, "notify", false, None);
        assert_eq!(step.end_time(), 3.0);
    }

    #[test]
    fn makespan_is_latest_end() {
        let plan = Plan::new(vec![
            PlanStep::new(0.0, "a", true, Some(5.0)),
            PlanStep::new(2.0, "b", true, Some(10.0)),
            PlanStep::new(4.0, "c", false, None),
        ]);
        assert_eq!(plan.makespan(), 12.0);
        assert_eq!(Plan::default().makespan(), 0.0);
    }

    #[test]
    fn unknown_commitment_tag_degrades() {
        let json = r#"{"startTime":0,"actionName":"a","commitment":"SomethingNew"}"#;
        let step: PlanStep = serde_json::from_str(json).unwrap_or_else(|_| PlanStep::new(0.0, "", false, None));
        assert_eq!(step.commitment, Some(PlanStepCommitment::Unrecognized));
        assert_eq!(step.iterations, 1);
    }
}
