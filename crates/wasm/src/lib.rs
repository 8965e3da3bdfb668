use std::sync::Arc;

use planviz_core::{DomainVizConfiguration, PlanViewEvent, PlanViewOptions, PlansView, parse_plan};
use planviz_protocol::{Link, RenderCommand, Viewport};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

fn events_json(events: &[PlanViewEvent]) -> Result<String, JsError> {
    serde_json::to_string(events).map_err(js_error)
}

#[derive(Serialize)]
struct Rendered<'a> {
    height: f64,
    commands: &'a [RenderCommand],
}

/// The plans shown in one host element. Each host element owns its own
/// handle; nothing is shared between handles.
#[wasm_bindgen]
pub struct PlanViewHandle {
    plans: PlansView,
}

#[wasm_bindgen]
impl PlanViewHandle {
    /// `options_json` is a `PlanViewOptions` document (empty for defaults);
    /// `config_json` an optional domain visualization configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: &str, config_json: Option<String>) -> Result<PlanViewHandle, JsError> {
        let options: PlanViewOptions = if options_json.trim().is_empty() {
            PlanViewOptions::default()
        } else {
            serde_json::from_str(options_json).map_err(js_error)?
        };
        let mut plans = PlansView::new(options);
        if let Some(config) = config_json {
            let settings = DomainVizConfiguration::from_json(config.as_bytes()).map_err(js_error)?;
            plans = plans.with_settings(Arc::new(settings));
        }
        Ok(Self { plans })
    }

    /// Parse and add a plan; returns the resulting events as JSON.
    pub fn add_plan(&mut self, data: &[u8]) -> Result<String, JsError> {
        let plan = parse_plan(data).map_err(js_error)?;
        events_json(&self.plans.add_plan(plan))
    }

    pub fn show_plan(&mut self, index: usize) -> Result<String, JsError> {
        events_json(&self.plans.show_plan(index))
    }

    pub fn selected_plan(&self) -> Option<usize> {
        self.plans.selected_plan()
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    pub fn clear(&mut self) {
        self.plans.clear();
    }

    /// Render commands of the selected plan as
    /// `{"height": …, "commands": [...]}`.
    pub fn render(&self) -> Result<String, JsError> {
        let Some(view) = self.plans.selected_plan().and_then(|i| self.plans.plan_view(i)) else {
            return Ok(r#"{"height":0,"commands":[]}"#.to_string());
        };
        let commands = view.render();
        let height = view.layout().map_or(0.0, |l| l.height);
        serde_json::to_string(&Rendered {
            height,
            commands: &commands,
        })
        .map_err(js_error)
    }

    pub fn on_viewport_changed(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        dpr: f64,
    ) -> Result<String, JsError> {
        let viewport = Viewport {
            x,
            y,
            width,
            height,
            dpr,
        };
        let mut events = Vec::new();
        for i in 0..self.plans.len() {
            if let Some(view) = self.plans.plan_view_mut(i) {
                events.extend(view.on_viewport_changed(viewport));
            }
        }
        events_json(&events)
    }

    pub fn set_display_width(&mut self, display_width: f64) {
        for i in 0..self.plans.len() {
            if let Some(view) = self.plans.plan_view_mut(i) {
                view.set_display_width(display_width);
            }
        }
    }

    /// Hand over line plots requested by a `linePlotsVisible` event.
    /// `legend_json` is `["a", …]`, `rows_json` is `[[x, y1, …], …]` with
    /// `null` for missing values.
    pub fn show_plan_line_plots(
        &mut self,
        plan_index: usize,
        title: &str,
        unit: &str,
        legend_json: &str,
        rows_json: &str,
    ) -> Result<(), JsError> {
        let legend: Vec<String> = serde_json::from_str(legend_json).map_err(js_error)?;
        let rows: Vec<Vec<Option<f64>>> = serde_json::from_str(rows_json).map_err(js_error)?;
        let view = self
            .plans
            .plan_view_mut(plan_index)
            .ok_or_else(|| JsError::new("invalid plan index"))?;
        view.show_plan_line_plots(title, unit, legend, rows);
        Ok(())
    }

    /// Dispatch a clicked link (`{"Action": "drive"}` or
    /// `{"HelpfulAction": "drive"}`) of the selected plan.
    pub fn activate(&self, link_json: &str) -> Result<String, JsError> {
        let link: Link = serde_json::from_str(link_json).map_err(js_error)?;
        let events: Vec<PlanViewEvent> = self
            .plans
            .selected_plan()
            .and_then(|i| self.plans.plan_view(i))
            .and_then(|view| view.activate(&link))
            .into_iter()
            .collect();
        events_json(&events)
    }
}
