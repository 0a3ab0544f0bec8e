/// Movement (CSS pixels) below which a press and release counts as a click.
pub const CLICK_TOLERANCE_PX: f64 = 4.0;

// Primary-button press/drag/release tracking
#[derive(Default, Debug, Clone)]
pub struct PointerGesture {
    pub pressed: bool,
    pub dragging: bool,
    pub start: [f64; 2],
    pub last: [f64; 2],
}

impl PointerGesture {
    pub fn press(&mut self, pixel: [f64; 2]) {
        *self = Self {
            pressed: true,
            dragging: false,
            start: pixel,
            last: pixel,
        };
    }

    /// Pan delta since the previous move, once the pointer has left the
    /// click tolerance. `None` while hovering or still within tolerance.
    pub fn drag_to(&mut self, pixel: [f64; 2]) -> Option<[f64; 2]> {
        if !self.pressed {
            return None;
        }
        if !self.dragging {
            let moved = (pixel[0] - self.start[0]).hypot(pixel[1] - self.start[1]);
            if moved <= CLICK_TOLERANCE_PX {
                return None;
            }
            self.dragging = true;
        }
        let delta = [pixel[0] - self.last[0], pixel[1] - self.last[1]];
        self.last = pixel;
        Some(delta)
    }

    /// Ends the gesture; true when it was a click rather than a drag.
    pub fn release(&mut self) -> bool {
        let click = self.pressed && !self.dragging;
        *self = Self::default();
        click
    }
}

/// How long a click waits for a possible second click before it counts.
pub const SINGLE_CLICK_DELAY_MS: i32 = 250;

/// A click held back until it is clear it was not half of a double-click.
#[derive(Default, Debug, Clone)]
pub struct PendingClick {
    pixel: Option<[f64; 2]>,
}

impl PendingClick {
    /// Holds `pixel`, replacing an earlier click that has not fired yet.
    pub fn arm(&mut self, pixel: [f64; 2]) {
        self.pixel = Some(pixel);
    }

    pub fn cancel(&mut self) {
        self.pixel = None;
    }

    /// Called when the delay runs out.
    pub fn fire(&mut self) -> Option<[f64; 2]> {
        self.pixel.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut g = PointerGesture::default();
        g.press([10.0, 10.0]);
        assert_eq!(g.drag_to([12.0, 11.0]), None);
        assert!(g.release());
    }

    #[test]
    fn drag_reports_full_delta_then_increments() {
        let mut g = PointerGesture::default();
        g.press([10.0, 10.0]);
        assert_eq!(g.drag_to([20.0, 10.0]), Some([10.0, 0.0]));
        assert_eq!(g.drag_to([25.0, 12.0]), Some([5.0, 2.0]));
        assert!(!g.release());
        assert!(!g.pressed);
    }

    #[test]
    fn hover_without_press_never_drags() {
        let mut g = PointerGesture::default();
        assert_eq!(g.drag_to([100.0, 100.0]), None);
        assert!(!g.release());
    }

    #[test]
    fn lone_click_fires_once() {
        let mut p = PendingClick::default();
        p.arm([3.0, 4.0]);
        assert_eq!(p.fire(), Some([3.0, 4.0]));
        assert_eq!(p.fire(), None);
    }

    #[test]
    fn double_click_swallows_both_clicks() {
        let mut p = PendingClick::default();
        p.arm([3.0, 4.0]);
        p.arm([3.0, 5.0]);
        p.cancel();
        assert_eq!(p.fire(), None);
    }
}
