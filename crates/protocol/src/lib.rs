pub mod commands;
pub mod domain;
pub mod plan;
pub mod theme;
pub mod types;

pub use commands::{Link, RenderCommand, TextAlign};
pub use domain::{ActionDefinition, DomainInfo, Parameter, ProblemInfo, TypeObjectMap};
pub use plan::{HappeningType, HelpfulAction, Plan, PlanStep, PlanStepCommitment};
pub use theme::{ACTION_PALETTE, ThemeToken, UNKNOWN_ACTION_COLOR};
pub use types::{Color, Point, Rect, Viewport};
