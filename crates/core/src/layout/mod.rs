pub mod commitment;
pub mod scale;
pub mod swim_lane;

pub use commitment::{DurationSplit, effective_duration, is_plan_head_step, split_duration};
pub use scale::TimeScale;
pub use swim_lane::SwimLane;
