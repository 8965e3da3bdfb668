use std::sync::Arc;

use planviz_protocol::Plan;

use crate::options::PlanViewOptions;
use crate::plan_view::{PlanView, PlanViewEvent};
use crate::settings::PlanVizSettings;
use crate::visualizer::VisualizerRegistry;

/// The plans found so far for one problem, with one of them selected.
pub struct PlansView {
    options: PlanViewOptions,
    settings: Option<Arc<dyn PlanVizSettings>>,
    visualizers: Arc<VisualizerRegistry>,
    plans: Vec<PlanView>,
    selected: Option<usize>,
}

impl std::fmt::Debug for PlansView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlansView")
            .field("plans", &self.plans)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl PlansView {
    pub fn new(options: PlanViewOptions) -> Self {
        Self {
            options,
            settings: None,
            visualizers: Arc::new(VisualizerRegistry::new()),
            plans: Vec::new(),
            selected: None,
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

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn selected_plan(&self) -> Option<usize> {
        self.selected
    }

    pub fn plan_view(&self, index: usize) -> Option<&PlanView> {
        self.plans.get(index)
    }

    pub fn plan_view_mut(&mut self, index: usize) -> Option<&mut PlanView> {
        self.plans.get_mut(index)
    }

    pub fn plan_views(&self) -> impl Iterator<Item = &PlanView> {
        self.plans.iter()
    }

    /// Append a plan and select it.
    pub fn add_plan(&mut self, plan: Plan) -> Vec<PlanViewEvent> {
        let index = self.plans.len();
        let mut view = PlanView::new(index, self.options.clone())
            .with_visualizers(Arc::clone(&self.visualizers));
        if let Some(settings) = &self.settings {
            view = view.with_settings(Arc::clone(settings));
        }
        let mut events = view.show_plan(plan);
        self.plans.push(view);
        events.extend(self.show_plan(index));
        events
    }

    /// Make the plan at `index` the only visible one and select it.
    pub fn show_plan(&mut self, index: usize) -> Vec<PlanViewEvent> {
        if index >= self.plans.len() {
            tracing::warn!(index, plans = self.plans.len(), "no such plan");
            return Vec::new();
        }
        let mut events = Vec::new();
        for view in &mut self.plans {
            events.extend(view.set_visible(view.plan_index() == index));
        }
        events.extend(self.set_selected_plan(index));
        events
    }

    /// Returns `PlanSelected` only when the selection actually changed.
    pub fn set_selected_plan(&mut self, index: usize) -> Option<PlanViewEvent> {
        if self.selected == Some(index) {
            return None;
        }
        self.selected = Some(index);
        Some(PlanViewEvent::PlanSelected { plan_index: index })
    }

    pub fn clear(&mut self) {
        self.plans.clear();
        self.selected = None;
    }
}
