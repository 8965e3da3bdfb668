//! Aligns the spelling of plan action and object names with their
//! declarations in the domain and problem. Planners treat names
//! case-insensitively and often echo them back in a different case.

use planviz_protocol::{Plan, PlanStep, ProblemInfo};

/// Rewrite action and object names to the domain/problem spelling.
///
/// Plans without a domain or problem are returned unchanged.
pub fn capitalize(plan: Plan) -> Plan {
    let steps = {
        let (Some(domain), Some(problem)) = (&plan.domain, &plan.problem) else {
            return plan;
        };
        let action_names: Vec<&str> = domain.actions.iter().map(|a| a.name.as_str()).collect();
        plan.steps
            .iter()
            .map(|step| capitalize_step(step, &action_names, problem))
            .collect()
    };

    Plan { steps, ..plan }
}

/// Capitalize one step against the declared `action_names` and the
/// problem's objects.
pub fn capitalize_step(step: &PlanStep, action_names: &[&str], problem: &ProblemInfo) -> PlanStep {
    let action_name = if action_names.contains(&step.action_name.as_str()) {
        step.action_name.clone()
    } else {
        action_names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(&step.action_name))
            .map_or_else(|| step.action_name.clone(), |name| (*name).to_string())
    };

    let objects = step
        .objects
        .iter()
        .map(|object| declared_spelling(object, problem).unwrap_or_else(|| object.clone()))
        .collect();

    PlanStep {
        action_name,
        objects,
        ..step.clone()
    }
}

fn declared_spelling(object: &str, problem: &ProblemInfo) -> Option<String> {
    let (_, declared) = problem.objects.type_of(object)?;
    declared
        .iter()
        .find(|o| o.as_str() == object)
        .or_else(|| declared.iter().find(|o| o.eq_ignore_ascii_case(object)))
        .cloned()
}
