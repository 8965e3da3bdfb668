use planviz_protocol::{Rect, Viewport};

/// One-shot trigger that fires the first time a region becomes visible.
///
/// After firing (or [`release`](Self::release)) it is inert until armed
/// again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityTrigger {
    region: Option<Rect>,
}

impl VisibilityTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `region` (document coordinates).
    pub fn arm(&mut self, region: Rect) {
        self.region = Some(region);
    }

    pub fn release(&mut self) {
        self.region = None;
    }

    pub fn is_armed(&self) -> bool {
        self.region.is_some()
    }

    pub fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Move the watched region, e.g. after the content above it changed
    /// height.
    pub fn update_region(&mut self, region: Rect) {
        if self.region.is_some() {
            self.region = Some(region);
        }
    }

    /// Returns `true` exactly once: on the first poll where the armed region
    /// intersects the viewport. `None` stands for an unknown viewport, which
    /// counts as visible.
    pub fn poll(&mut self, viewport: Option<&Viewport>) -> bool {
        let Some(region) = self.region else {
            return false;
        };
        if viewport.is_none_or(|v| v.intersects(&region)) {
            tracing::trace!(?region, "visibility trigger fired");
            self.region = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(y: f64) -> Viewport {
        Viewport {
            x: 0.0,
            y,
            width: 800.0,
            height: 600.0,
            dpr: 1.0,
        }
    }

    #[test]
    fn fires_once_when_scrolled_into_view() {
        let mut trigger = VisibilityTrigger::new();
        trigger.arm(Rect::new(0.0, 1000.0, 500.0, 200.0));
        assert!(!trigger.poll(Some(&viewport(0.0))));
        assert!(trigger.is_armed());
        assert!(trigger.poll(Some(&viewport(500.0))));
        assert!(!trigger.is_armed());
        assert!(!trigger.poll(Some(&viewport(900.0))));
    }

    #[test]
    fn unknown_viewport_counts_as_visible() {
        let mut trigger = VisibilityTrigger::new();
        trigger.arm(Rect::new(0.0, 5000.0, 10.0, 10.0));
        assert!(trigger.poll(None));
    }

    #[test]
    fn released_trigger_never_fires() {
        let mut trigger = VisibilityTrigger::new();
        trigger.arm(Rect::new(0.0, 0.0, 10.0, 10.0));
        trigger.release();
        assert!(!trigger.poll(Some(&viewport(0.0))));
        assert!(!trigger.poll(None));
    }

    #[test]
    fn update_region_does_not_arm() {
        let mut trigger = VisibilityTrigger::new();
        trigger.update_region(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(!trigger.is_armed());
    }
}
