//! One plan's visualization: the optional custom visualization, the Gantt
//! chart, the swim lanes and the lazily generated line charts, stacked
//! vertically.

use std::sync::Arc;

use planviz_protocol::{Link, Plan, Rect, RenderCommand, Viewport};
use serde::{Deserialize, Serialize};

use crate::capitalization::capitalize;
use crate::options::PlanViewOptions;
use crate::settings::PlanVizSettings;
use crate::views::gantt::{GanttLayout, layout_gantt, render_gantt};
use crate::views::line_chart::{LinePlot, line_plot_size, render_line_plot, render_loader};
use crate::views::swim_lanes::{SwimLanesLayout, layout_swim_lanes, render_swim_lanes};
use crate::visibility::VisibilityTrigger;
use crate::visualizer::{VisualizerRegistry, render_visualization};

/// Vertical space between the stacked sections.
const SECTION_GAP: f64 = 10.0;

/// Notification for the host. Views return these instead of calling back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlanViewEvent {
    /// An action name was selected; reveal its declaration.
    #[serde(rename_all = "camelCase")]
    ActionSelected { plan_index: usize, action_name: String },
    /// A helpful action was selected; apply it.
    #[serde(rename_all = "camelCase")]
    HelpfulActionSelected { plan_index: usize, action_name: String },
    /// The line-chart area became visible; the host should compute the
    /// plots and hand them over with [`PlanView::show_plan_line_plots`].
    #[serde(rename_all = "camelCase")]
    LinePlotsVisible { plan_index: usize },
    #[serde(rename_all = "camelCase")]
    PlanSelected { plan_index: usize },
}

#[derive(Debug, Clone, PartialEq, Default)]
enum LinePlots {
    #[default]
    None,
    /// Loader placeholder until the host delivers the plots.
    Pending,
    Ready(Vec<LinePlot>),
}

/// Vertical arrangement of one plan's sections.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanLayout {
    /// Custom visualization commands (already positioned at the top) and
    /// their height.
    pub visualization: Option<(Vec<RenderCommand>, f64)>,
    pub gantt_top: f64,
    pub gantt: GanttLayout,
    pub swim_lanes_top: f64,
    pub swim_lanes: Option<SwimLanesLayout>,
    pub line_plots_top: f64,
    pub height: f64,
}

pub struct PlanView {
    plan_index: usize,
    options: PlanViewOptions,
    settings: Option<Arc<dyn PlanVizSettings>>,
    visualizers: Arc<VisualizerRegistry>,
    plan: Option<Plan>,
    /// Custom visualization of the shown plan, produced once per plan and
    /// display width.
    visualization: Option<(Vec<RenderCommand>, f64)>,
    visible: bool,
    viewport: Option<Viewport>,
    line_plots: LinePlots,
    trigger: VisibilityTrigger,
}

impl std::fmt::Debug for PlanView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanView")
            .field("plan_index", &self.plan_index)
            .field("options", &self.options)
            .field("has_settings", &self.settings.is_some())
            .field("plan", &self.plan)
            .field("visible", &self.visible)
            .field("line_plots", &self.line_plots)
            .finish_non_exhaustive()
    }
}

impl PlanView {
    pub fn new(plan_index: usize, options: PlanViewOptions) -> Self {
        Self {
            plan_index,
            options,
            settings: None,
            visualizers: Arc::new(VisualizerRegistry::new()),
            plan: None,
            visualization: None,
            visible: true,
            viewport: None,
            line_plots: LinePlots::None,
            trigger: VisibilityTrigger::new(),
        }
    }

    pub fn with_settings(mut self, settings: Arc<dyn PlanVizSettings>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_visualizers(mut self, visualizers: Arc<VisualizerRegistry>) -> Self {
        self.visualizers = visualizers;
        self
    }

    pub fn plan_index(&self) -> usize {
        self.plan_index
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn options(&self) -> &PlanViewOptions {
        &self.options
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn line_plots(&self) -> &[LinePlot] {
        match &self.line_plots {
            LinePlots::Ready(plots) => plots,
            _ => &[],
        }
    }

    /// Whether the loader placeholder stands in for the line charts.
    pub fn is_loading_line_plots(&self) -> bool {
        self.line_plots == LinePlots::Pending
    }

    /// Replace the shown plan with `plan`, with action and object names
    /// aligned to the domain/problem spelling.
    pub fn show_plan(&mut self, plan: Plan) -> Vec<PlanViewEvent> {
        self.clear();
        let plan = capitalize(plan);
        tracing::debug!(
            plan_index = self.plan_index,
            steps = plan.steps.len(),
            makespan = plan.makespan(),
            "showing plan"
        );
        let wants_line_plots =
            !self.options.disable_line_plots && plan.domain.is_some() && plan.problem.is_some();
        self.plan = Some(plan);
        self.refresh_visualization();
        if wants_line_plots {
            self.line_plots = LinePlots::Pending;
        }
        self.arm_line_plots_trigger()
    }

    /// Add a line chart to the shown plan. Rows are `[x, y1, y2, …]`.
    pub fn show_plan_line_plots(
        &mut self,
        title: impl Into<String>,
        unit: impl Into<String>,
        legend: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) {
        if self.plan.is_none() {
            tracing::warn!(plan_index = self.plan_index, "line plots delivered without a plan");
            return;
        }
        self.trigger.release();
        let plot = LinePlot {
            title: title.into(),
            unit: unit.into(),
            legend,
            rows,
        };
        match &mut self.line_plots {
            LinePlots::Ready(plots) => plots.push(plot),
            other => *other = LinePlots::Ready(vec![plot]),
        }
    }

    pub fn clear(&mut self) {
        self.plan = None;
        self.visualization = None;
        self.line_plots = LinePlots::None;
        self.trigger.release();
    }

    /// Hiding releases the pending line-chart trigger; showing re-arms it
    /// while the plots are still missing.
    pub fn set_visible(&mut self, visible: bool) -> Vec<PlanViewEvent> {
        if self.visible == visible {
            return Vec::new();
        }
        self.visible = visible;
        if visible {
            self.arm_line_plots_trigger()
        } else {
            self.trigger.release();
            Vec::new()
        }
    }

    /// Takes effect with the next [`render`](Self::render).
    pub fn set_display_width(&mut self, display_width: f64) {
        if self.options.display_width != display_width {
            self.options.display_width = display_width;
            self.refresh_visualization();
        }
        if let Some(region) = self.line_plots_region() {
            self.trigger.update_region(region);
        }
    }

    pub fn on_viewport_changed(&mut self, viewport: Viewport) -> Vec<PlanViewEvent> {
        self.viewport = Some(viewport);
        self.poll_trigger()
    }

    /// Dispatch a selected link to the matching event.
    pub fn activate(&self, link: &Link) -> Option<PlanViewEvent> {
        self.plan.as_ref()?;
        let plan_index = self.plan_index;
        Some(match link {
            Link::Action(action_name) => PlanViewEvent::ActionSelected {
                plan_index,
                action_name: action_name.clone(),
            },
            Link::HelpfulAction(action_name) => PlanViewEvent::HelpfulActionSelected {
                plan_index,
                action_name: action_name.clone(),
            },
        })
    }

    fn refresh_visualization(&mut self) {
        self.visualization = self.plan.as_ref().and_then(|plan| {
            let name = self.settings.as_deref()?.custom_visualization()?;
            Some(render_visualization(
                &self.visualizers,
                name,
                plan,
                self.options.display_width,
            ))
        });
    }

    fn arm_line_plots_trigger(&mut self) -> Vec<PlanViewEvent> {
        if !self.visible || self.line_plots != LinePlots::Pending {
            return Vec::new();
        }
        if let Some(region) = self.line_plots_region() {
            self.trigger.arm(region);
        }
        self.poll_trigger()
    }

    fn poll_trigger(&mut self) -> Vec<PlanViewEvent> {
        if self.trigger.poll(self.viewport.as_ref()) {
            vec![PlanViewEvent::LinePlotsVisible {
                plan_index: self.plan_index,
            }]
        } else {
            Vec::new()
        }
    }

    fn line_plots_region(&self) -> Option<Rect> {
        let layout = self.layout()?;
        let (width, height) = line_plot_size(self.options.display_width);
        Some(Rect::new(0.0, layout.line_plots_top, width, height))
    }

    fn line_plots_height(&self) -> f64 {
        let (_, height) = line_plot_size(self.options.display_width);
        match &self.line_plots {
            LinePlots::None => 0.0,
            LinePlots::Pending => height,
            LinePlots::Ready(plots) => {
                (plots.len() as f64 * (height + SECTION_GAP) - SECTION_GAP).max(0.0)
            }
        }
    }

    pub fn layout(&self) -> Option<PlanLayout> {
        let plan = self.plan.as_ref()?;
        let settings = self.settings.as_deref();
        let mut y = 0.0;

        let visualization = self.visualization.clone();
        if let Some((_, height)) = &visualization {
            y += height + SECTION_GAP;
        }

        let gantt_top = y;
        let gantt = layout_gantt(plan, settings, &self.options);
        y += gantt.height + SECTION_GAP;

        let swim_lanes_top = y;
        let swim_lanes = layout_swim_lanes(plan, settings, &self.options);
        if let Some(lanes) = &swim_lanes {
            y += lanes.height() + SECTION_GAP;
        }

        let line_plots_top = y;
        y += self.line_plots_height();

        Some(PlanLayout {
            visualization,
            gantt_top,
            gantt,
            swim_lanes_top,
            swim_lanes,
            line_plots_top,
            height: y,
        })
    }

    /// Full command list for the view; empty while hidden or without a plan.
    pub fn render(&self) -> Vec<RenderCommand> {
        if !self.visible {
            return Vec::new();
        }
        let Some(layout) = self.layout() else {
            return Vec::new();
        };

        let mut commands = Vec::new();
        if let Some((visualization, _)) = layout.visualization {
            commands.extend(visualization);
        }
        commands.extend(
            render_gantt(&layout.gantt, &self.options)
                .into_iter()
                .map(|c| c.offset_y(layout.gantt_top)),
        );
        if let Some(lanes) = &layout.swim_lanes {
            commands.extend(
                render_swim_lanes(lanes, &self.options)
                    .into_iter()
                    .map(|c| c.offset_y(layout.swim_lanes_top)),
            );
        }

        let (width, height) = line_plot_size(self.options.display_width);
        match &self.line_plots {
            LinePlots::None => {}
            LinePlots::Pending => commands.extend(
                render_loader(width, height)
                    .into_iter()
                    .map(|c| c.offset_y(layout.line_plots_top)),
            ),
            LinePlots::Ready(plots) => {
                for (i, plot) in plots.iter().enumerate() {
                    let top = layout.line_plots_top + i as f64 * (height + SECTION_GAP);
                    commands.extend(
                        render_line_plot(plot, &format!("line-plot-{i}"), width, height)
                            .into_iter()
                            .map(|c| c.offset_y(top)),
                    );
                }
            }
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DomainVizConfiguration;
    use crate::visualizer::Visualization;
    use planviz_protocol::{
        ActionDefinition, DomainInfo, HappeningType, HelpfulAction, PlanStep, ProblemInfo,
        ThemeToken, TypeObjectMap,
    };

    fn domain() -> DomainInfo {
        DomainInfo {
            name: "logistics".into(),
            types: vec!["object".into(), "truck".into()],
            actions: vec![ActionDefinition {
                name: "drive".into(),
                parameters: vec![],
            }],
            ..DomainInfo::default()
        }
    }

    fn plan() -> Plan {
        Plan {
            domain: Some(domain()),
            problem: Some(ProblemInfo {
                objects: TypeObjectMap::new().add("truck", "t1"),
                ..ProblemInfo::default()
            }),
            helpful_actions: vec![HelpfulAction {
                action_name: "drive".into(),
                kind: HappeningType::Start,
            }],
            ..Plan::new(vec![PlanStep::new(0.0, "DRIVE T1", true, Some(4.0))])
        }
    }

    fn viewport(y: f64) -> Viewport {
        Viewport {
            x: 0.0,
            y,
            width: 800.0,
            height: 50.0,
            dpr: 1.0,
        }
    }

    fn visible_events(events: &[PlanViewEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, PlanViewEvent::LinePlotsVisible { plan_index: 3 }))
            .count()
    }

    #[test]
    fn shows_capitalized_plan() {
        let mut view = PlanView::new(0, PlanViewOptions::default());
        view.show_plan(plan());
        let step = view.plan().map(|p| p.steps[0].full_action_name());
        assert_eq!(step.as_deref(), Some("drive t1"));
    }

    #[test]
    fn line_plots_requested_immediately_when_already_visible() {
        let mut view = PlanView::new(3, PlanViewOptions::default());
        let events = view.show_plan(plan());
        assert_eq!(visible_events(&events), 1);
        // Fired once: further scrolling stays quiet.
        assert!(view.on_viewport_changed(viewport(0.0)).is_empty());
        assert!(view.is_loading_line_plots());
    }

    #[test]
    fn line_plots_requested_when_scrolled_into_view() {
        let mut view = PlanView::new(3, PlanViewOptions::default());
        view.on_viewport_changed(viewport(0.0));
        assert!(view.show_plan(plan()).is_empty());

        let top = view.layout().map_or(0.0, |l| l.line_plots_top);
        assert!(top > 50.0);
        assert!(view.on_viewport_changed(viewport(top - 60.0)).is_empty());
        assert_eq!(visible_events(&view.on_viewport_changed(viewport(top - 10.0))), 1);
        assert!(view.on_viewport_changed(viewport(top)).is_empty());
    }

    #[test]
    fn hiding_releases_and_showing_rearms_until_plots_arrive() {
        let mut view = PlanView::new(3, PlanViewOptions::default());
        view.on_viewport_changed(viewport(0.0));
        view.show_plan(plan());
        assert!(view.set_visible(false).is_empty());
        assert!(view.render().is_empty());

        view.on_viewport_changed(viewport(10_000.0));
        let top = view.layout().map_or(0.0, |l| l.line_plots_top);
        view.on_viewport_changed(viewport(top));
        assert_eq!(visible_events(&view.set_visible(true)), 1);

        view.show_plan_line_plots("fuel", "l", vec!["t1".into()], vec![vec![Some(0.0), Some(1.0)]]);
        assert!(!view.is_loading_line_plots());
        view.set_visible(false);
        assert!(view.set_visible(true).is_empty());
    }

    #[test]
    fn repeated_set_visible_requests_line_plots_once() {
        let mut view = PlanView::new(3, PlanViewOptions::default());
        assert_eq!(visible_events(&view.show_plan(plan())), 1);
        assert!(view.set_visible(true).is_empty());
        assert!(view.set_visible(true).is_empty());
        assert!(view.set_visible(false).is_empty());
        assert!(view.set_visible(false).is_empty());
        assert!(view.is_loading_line_plots());
    }

    #[test]
    fn no_line_plots_without_problem_or_when_disabled() {
        let mut view = PlanView::new(3, PlanViewOptions::default());
        let events = view.show_plan(Plan {
            problem: None,
            ..plan()
        });
        assert!(events.is_empty());
        assert!(!view.is_loading_line_plots());

        let options = PlanViewOptions {
            disable_line_plots: true,
            ..PlanViewOptions::default()
        };
        let mut view = PlanView::new(3, options);
        assert!(view.show_plan(plan()).is_empty());
    }

    #[test]
    fn clear_drops_plan_and_trigger() {
        let mut view = PlanView::new(3, PlanViewOptions::default());
        view.on_viewport_changed(viewport(10_000.0));
        view.show_plan(plan());
        view.clear();
        assert!(view.plan().is_none());
        assert!(view.render().is_empty());
        assert!(view.on_viewport_changed(viewport(0.0)).is_empty());
    }

    #[test]
    fn links_become_events() {
        let mut view = PlanView::new(2, PlanViewOptions::default());
        assert_eq!(view.activate(&Link::Action("drive".into())), None);
        view.show_plan(plan());
        assert_eq!(
            view.activate(&Link::HelpfulAction("drive".into())),
            Some(PlanViewEvent::HelpfulActionSelected {
                plan_index: 2,
                action_name: "drive".into()
            })
        );
        let event = view.activate(&Link::Action("drive".into()));
        assert!(matches!(event, Some(PlanViewEvent::ActionSelected { plan_index: 2, .. })));
    }

    #[test]
    fn sections_are_stacked_without_overlap() {
        let mut view = PlanView::new(0, PlanViewOptions::default());
        view.show_plan(plan());
        view.show_plan_line_plots("fuel", "l", vec![], vec![]);
        let layout = view.layout();
        let Some(layout) = layout else {
            panic!("plan shown");
        };
        assert_eq!(layout.gantt_top, 0.0);
        assert!(layout.swim_lanes_top >= layout.gantt.height);
        let lanes_height = layout.swim_lanes.as_ref().map_or(0.0, SwimLanesLayout::height);
        assert!(layout.line_plots_top >= layout.swim_lanes_top + lanes_height);
        assert!(layout.height > layout.line_plots_top);
    }

    #[test]
    fn custom_visualization_is_drawn_on_top() {
        let settings =
            DomainVizConfiguration::from_json(br#"{"customVisualization": "summary"}"#).unwrap_or_default();
        let mut registry = VisualizerRegistry::new();
        registry.register("summary", |plan: &Plan, _: f64| -> Result<Visualization, String> {
            Ok(Visualization::Text(format!("{} steps", plan.steps.len())))
        });
        let mut view = PlanView::new(0, PlanViewOptions::default())
            .with_settings(Arc::new(settings))
            .with_visualizers(Arc::new(registry));
        view.show_plan(plan());

        let layout = view.layout();
        assert!(layout.as_ref().is_some_and(|l| l.gantt_top > 0.0));
        let first_text = view.render().into_iter().find_map(|c| match c {
            RenderCommand::DrawText { text, color, .. } => Some((text, color)),
            _ => None,
        });
        assert_eq!(first_text, Some(("1 steps".to_string(), ThemeToken::TextPrimary)));
    }

    #[test]
    fn custom_visualization_runs_once_per_plan_and_width() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let settings =
            DomainVizConfiguration::from_json(br#"{"customVisualization": "broken"}"#).unwrap_or_default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = VisualizerRegistry::new();
        registry.register("broken", move |_: &Plan, _: f64| -> Result<Visualization, String> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("no chart".into())
        });
        let mut view = PlanView::new(0, PlanViewOptions::default())
            .with_settings(Arc::new(settings))
            .with_visualizers(Arc::new(registry));

        view.show_plan(plan());
        view.render();
        view.render();
        view.layout();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let width = view.options().display_width;
        view.set_display_width(width);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        view.set_display_width(width + 100.0);
        view.render();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let error = view.render().into_iter().find_map(|c| match c {
            RenderCommand::DrawText { text, color, .. } => Some((text, color)),
            _ => None,
        });
        assert_eq!(error, Some(("Error: no chart".to_string(), ThemeToken::ErrorText)));
    }

    #[test]
    fn events_serialize_for_hosts() {
        let event = PlanViewEvent::HelpfulActionSelected {
            plan_index: 1,
            action_name: "drive".into(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert_eq!(json, r#"{"type":"helpfulActionSelected","planIndex":1,"actionName":"drive"}"#);
    }
}
