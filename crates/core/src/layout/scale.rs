/// Linear mapping from plan time to horizontal view pixels:
/// `x = time / makespan * display_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    makespan: f64,
    display_width: f64,
}

impl TimeScale {
    /// A non-positive (or non-finite) makespan is replaced by `epsilon` so
    /// that an empty or all-instantaneous plan never divides by zero.
    pub fn new(makespan: f64, display_width: f64, epsilon: f64) -> Self {
        let makespan = if makespan.is_finite() && makespan > 0.0 {
            makespan
        } else {
            epsilon.max(f64::MIN_POSITIVE)
        };
        Self {
            makespan,
            display_width,
        }
    }

    /// View coordinate of `time`; a missing time maps to 0.
    pub fn to_view(&self, time: Option<f64>) -> f64 {
        time.unwrap_or(0.0) / self.makespan * self.display_width
    }

    pub fn display_width(&self) -> f64 {
        self.display_width
    }
}
