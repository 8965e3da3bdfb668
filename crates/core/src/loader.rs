use planviz_protocol::{Plan, PlanStep};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanLoadError {
    #[error("invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("step {index}: start time {start_time} is not a finite number")]
    NonFiniteStart { index: usize, start_time: f64 },
    #[error("`now` is not a finite number")]
    NonFiniteNow,
}

/// Parse a plan document.
///
/// Accepts either a full plan object (`{"steps": [...], "domain": ...}`)
/// or a bare array of steps.
pub fn parse_plan(data: &[u8]) -> Result<Plan, PlanLoadError> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    let plan = if value.is_array() {
        Plan::new(serde_json::from_value::<Vec<PlanStep>>(value)?)
    } else {
        serde_json::from_value(value)?
    };
    validate(&plan)?;
    tracing::debug!(
        steps = plan.steps.len(),
        has_domain = plan.domain.is_some(),
        has_problem = plan.problem.is_some(),
        "parsed plan"
    );
    Ok(plan)
}

fn validate(plan: &Plan) -> Result<(), PlanLoadError> {
    if let Some((index, step)) = plan
        .steps
        .iter()
        .enumerate()
        .find(|(_, step)| !step.start_time.is_finite())
    {
        return Err(PlanLoadError::NonFiniteStart {
            index,
            start_time: step.start_time,
        });
    }
    if plan.now.is_some_and(|now| !now.is_finite()) {
        return Err(PlanLoadError::NonFiniteNow);
    }
    Ok(())
}
