//! Plan visualization: packs overlapping plan actions into swim lanes,
//! splits steps into their committed and relaxed parts around the plan's
//! "now" cursor, and turns a plan into [`RenderCommand`] lists for any
//! renderer.
//!
//! [`RenderCommand`]: planviz_protocol::RenderCommand

pub mod capitalization;
pub mod layout;
pub mod loader;
pub mod options;
pub mod plan_view;
pub mod plans_view;
pub mod settings;
pub mod svg;
pub mod views;
pub mod visibility;
pub mod visualizer;

pub use loader::{PlanLoadError, parse_plan};
pub use options::PlanViewOptions;
pub use plan_view::{PlanLayout, PlanView, PlanViewEvent};
pub use plans_view::PlansView;
pub use settings::{ConfigError, DomainVizConfiguration, PlanVizSettings};
pub use visualizer::{PlanVisualizer, Visualization, VisualizerError, VisualizerRegistry};
