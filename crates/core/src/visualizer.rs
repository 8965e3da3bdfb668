//! Custom per-domain plan visualizations.
//!
//! A domain configuration may name a visualizer; hosts register
//! implementations under those names up front.

use std::collections::HashMap;
use std::sync::Arc;

use planviz_protocol::{Plan, Point, RenderCommand, TextAlign, ThemeToken};
use thiserror::Error;

use crate::views::commands_extent;

#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("no visualizer registered under `{0}`")]
    NotRegistered(String),
    #[error("visualizer `{name}` failed: {message}")]
    Failed { name: String, message: String },
}

/// Output of a custom visualizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    /// Plain text, shown line by line.
    Text(String),
    /// Render commands positioned relative to the visualization area.
    Drawing(Vec<RenderCommand>),
}

pub trait PlanVisualizer: Send + Sync {
    /// Visualize `plan` in an area `width` pixels wide.
    fn visualize(&self, plan: &Plan, width: f64) -> Result<Visualization, String>;
}

impl<F> PlanVisualizer for F
where
    F: Fn(&Plan, f64) -> Result<Visualization, String> + Send + Sync,
{
    fn visualize(&self, plan: &Plan, width: f64) -> Result<Visualization, String> {
        self(plan, width)
    }
}

#[derive(Clone, Default)]
pub struct VisualizerRegistry {
    visualizers: HashMap<String, Arc<dyn PlanVisualizer>>,
}

impl std::fmt::Debug for VisualizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.visualizers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("VisualizerRegistry").field("visualizers", &names).finish()
    }
}

impl VisualizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `visualizer` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, visualizer: impl PlanVisualizer + 'static) {
        self.visualizers.insert(name.into(), Arc::new(visualizer));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.visualizers.contains_key(name)
    }

    pub fn visualize(&self, name: &str, plan: &Plan, width: f64) -> Result<Visualization, VisualizerError> {
        let visualizer = self
            .visualizers
            .get(name)
            .ok_or_else(|| VisualizerError::NotRegistered(name.to_string()))?;
        visualizer
            .visualize(plan, width)
            .map_err(|message| VisualizerError::Failed {
                name: name.to_string(),
                message,
            })
    }
}

const FONT_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 16.0;

/// Render the named visualizer's output for `plan`. Failures become an
/// inline `Error: …` line instead of aborting the rest of the view.
///
/// Returns the commands and the height they occupy.
pub fn render_visualization(
    registry: &VisualizerRegistry,
    name: &str,
    plan: &Plan,
    width: f64,
) -> (Vec<RenderCommand>, f64) {
    let mut commands = vec![RenderCommand::BeginGroup {
        id: "plan-visualization".into(),
        label: Some(name.to_string()),
    }];

    let body = match registry.visualize(name, plan, width) {
        Ok(Visualization::Drawing(drawing)) => drawing,
        Ok(Visualization::Text(text)) => text_lines(text.lines(), ThemeToken::TextPrimary),
        Err(err) => {
            tracing::warn!(visualizer = name, error = %err, "custom visualization failed");
            text_lines(std::iter::once(format!("Error: {err}").as_str()), ThemeToken::ErrorText)
        }
    };
    let height = commands_extent(&body);
    commands.extend(body);
    commands.push(RenderCommand::EndGroup);
    (commands, height)
}

fn text_lines<'a>(lines: impl Iterator<Item = &'a str>, color: ThemeToken) -> Vec<RenderCommand> {
    lines
        .enumerate()
        .map(|(i, line)| RenderCommand::DrawText {
            position: Point::new(0.0, (i + 1) as f64 * LINE_HEIGHT),
            text: line.to_string(),
            color,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            link: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use planviz_protocol::PlanStep;

    fn plan() -> Plan {
        Plan::new(vec![
            PlanStep::new(0.0, "a x", false, None),
            PlanStep::new(1.0, "b y", false, None),
        ])
    }

    fn step_counter(plan: &Plan, _width: f64) -> Result<Visualization, String> {
        Ok(Visualization::Text(format!("{} steps\nmakespan {}", plan.steps.len(), plan.makespan())))
    }

    fn texts(commands: &[RenderCommand]) -> Vec<(&str, ThemeToken)> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, color, .. } => Some((text.as_str(), *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn text_output_is_drawn_line_by_line() {
        let mut registry = VisualizerRegistry::new();
        registry.register("counter", step_counter);
        let (commands, height) = render_visualization(&registry, "counter", &plan(), 300.0);
        assert_eq!(
            texts(&commands),
            [("2 steps", ThemeToken::TextPrimary), ("makespan 1", ThemeToken::TextPrimary)]
        );
        assert!(height > LINE_HEIGHT);
    }

    #[test]
    fn unregistered_visualizer_renders_inline_error() {
        let registry = VisualizerRegistry::new();
        let (commands, _) = render_visualization(&registry, "depot-map", &plan(), 300.0);
        assert_eq!(
            texts(&commands),
            [("Error: no visualizer registered under `depot-map`", ThemeToken::ErrorText)]
        );
    }

    #[test]
    fn failing_visualizer_renders_inline_error() {
        let mut registry = VisualizerRegistry::new();
        registry.register("broken", |_: &Plan, _: f64| -> Result<Visualization, String> {
            Err("no depots".into())
        });
        let err = registry.visualize("broken", &plan(), 100.0);
        assert!(matches!(err, Err(VisualizerError::Failed { .. })));
        let (commands, _) = render_visualization(&registry, "broken", &plan(), 100.0);
        assert_eq!(texts(&commands)[0].0, "Error: visualizer `broken` failed: no depots");
    }

    #[test]
    fn drawing_output_is_passed_through() {
        let mut registry = VisualizerRegistry::new();
        registry.register("line", |_: &Plan, width: f64| -> Result<Visualization, String> {
            Ok(Visualization::Drawing(vec![RenderCommand::DrawLine {
                from: Point::new(0.0, 0.0),
                to: Point::new(width, 40.0),
                color: ThemeToken::Border,
                width: 1.0,
            }]))
        });
        let (commands, height) = render_visualization(&registry, "line", &plan(), 100.0);
        assert_eq!(commands.len(), 3);
        assert_eq!(height, 40.0);
    }
}
