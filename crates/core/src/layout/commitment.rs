//! Splitting plan steps into their committed ("plan head") and speculative
//! ("relaxed plan") portions relative to the plan's "now" cursor.

use planviz_protocol::{PlanStep, PlanStepCommitment};

/// How much of a step's duration is drawn as plan head vs. relaxed plan.
///
/// `plan_head + relaxed` always equals the step's effective duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationSplit {
    pub plan_head: f64,
    pub relaxed: f64,
}

impl DurationSplit {
    fn committed(total: f64) -> Self {
        Self {
            plan_head: total,
            relaxed: 0.0,
        }
    }

    fn relaxed(total: f64) -> Self {
        Self {
            plan_head: 0.0,
            relaxed: total,
        }
    }

    pub fn total(&self) -> f64 {
        self.plan_head + self.relaxed
    }
}

/// The step's duration, or `epsilon` when it has none (or a non-positive one).
pub fn effective_duration(step: &PlanStep, epsilon: f64) -> f64 {
    match step.duration {
        Some(duration) if duration > 0.0 => duration,
        _ => epsilon,
    }
}

/// Split the step's duration around `now`.
///
/// Never fails: commitment tags it does not understand classify the
/// step as fully relaxed.
pub fn split_duration(step: &PlanStep, now: Option<f64>, epsilon: f64) -> DurationSplit {
    let total = effective_duration(step, epsilon);
    let Some(now) = now else {
        return DurationSplit::committed(total);
    };

    let end_committed = matches!(step.commitment, None | Some(PlanStepCommitment::Committed));

    if step.end_time() < now {
        // Finished before "now", but only fixed if its end was committed.
        return if end_committed {
            DurationSplit::committed(total)
        } else {
            DurationSplit::relaxed(total)
        };
    }
    if step.start_time >= now {
        return DurationSplit::relaxed(total);
    }

    // "now" falls within [start, end].
    match step.commitment {
        None | Some(PlanStepCommitment::Committed) => DurationSplit::committed(total),
        Some(PlanStepCommitment::StartsInRelaxedPlan) => {
            let plan_head = (now - step.start_time).clamp(0.0, total);
            DurationSplit {
                plan_head,
                relaxed: total - plan_head,
            }
        }
        Some(PlanStepCommitment::EndsInRelaxedPlan | PlanStepCommitment::Unrecognized) => {
            DurationSplit::relaxed(total)
        }
    }
}

/// Whether the step is drawn in the head batch of the Gantt chart (above
/// the helpful-actions marker) rather than the relaxed batch below it.
///
/// This is independent of [`split_duration`]: an `EndsInRelaxedPlan` step
/// sits in the head batch even though its bar is drawn fully relaxed.
pub fn is_plan_head_step(step: &PlanStep, now: Option<f64>) -> bool {
    now.is_none()
        || matches!(
            step.commitment,
            None | Some(PlanStepCommitment::Committed | PlanStepCommitment::EndsInRelaxedPlan)
        )
}
