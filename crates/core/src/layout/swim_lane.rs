/// Packs intervals onto a bounded set of parallel lanes.
///
/// Each call to [`SwimLane::place_next`] puts the interval on the
/// lowest-numbered lane whose last interval ends at or before the new
/// interval's start (touching is allowed), opening a new lane only when
/// every existing lane is still occupied.
///
/// One packer lays out exactly one display row. Build a fresh one per row:
/// the occupancy it records is only meaningful for the intervals of that
/// row.
#[derive(Debug, Clone)]
pub struct SwimLane {
    /// Minimum width an interval occupies, so instantaneous actions at
    /// the same instant still stack instead of collapsing onto one lane.
    min_width: f64,
    /// Right edge of the last interval placed in each lane.
    lane_ends: Vec<f64>,
}

impl SwimLane {
    pub fn new(min_width: f64) -> Self {
        Self {
            min_width: min_width.max(0.0),
            lane_ends: Vec::new(),
        }
    }

    /// Place an interval and return its lane index.
    pub fn place_next(&mut self, start: f64, width: f64) -> usize {
        let end = start + width.max(self.min_width);

        let free = self
            .lane_ends
            .iter_mut()
            .enumerate()
            .find(|(_, lane_end)| **lane_end <= start);

        let lane = match free {
            Some((lane, lane_end)) => {
                *lane_end = end;
                lane
            }
            None => {
                self.lane_ends.push(end);
                self.lane_ends.len() - 1
            }
        };
        tracing::trace!(start, width, lane, "placed interval");
        lane
    }

    /// Number of lanes opened so far.
    pub fn lane_count(&self) -> usize {
        self.lane_ends.len()
    }
}
