/// Entrance animation for the size label
///
/// A damped spring pulls the scale from 0 to 1. The reveal is keyed on the
/// value it animated: once a size has been revealed, re-renders with the same
/// value never restart it. A new `SizeReveal` (a fresh mount) starts over.
use std::time::Duration;

/// Spring parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            stiffness: 260.0,
            damping: 20.0,
            mass: 1.0,
        }
    }
}

/// Integration step, small enough to stay stable at these stiffness values
const STEP: f32 = 1.0 / 240.0;
/// Longest frame gap we integrate; longer stalls are clamped
const MAX_FRAME: f32 = 0.1;
const REST_DELTA: f32 = 0.001;
const REST_SPEED: f32 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct SizeReveal {
    spring: Spring,
    scale: f32,
    velocity: f32,
    running: bool,
    /// The value that already got its entrance
    animated: Option<String>,
}

impl SizeReveal {
    pub fn new(spring: Spring) -> Self {
        Self {
            spring,
            ..Self::default()
        }
    }

    /// Note the current size value; starts the animation the first time a
    /// value shows up. Returns true if an animation was started.
    pub fn observe(&mut self, size: Option<&str>) -> bool {
        let Some(size) = size else {
            return false;
        };
        if self.animated.as_deref() == Some(size) {
            return false;
        }
        self.animated = Some(size.to_string());
        self.scale = 0.0;
        self.velocity = 0.0;
        self.running = true;
        true
    }

    /// Advance the spring by a frame delta
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.running {
            return;
        }
        let mut remaining = elapsed.as_secs_f32().min(MAX_FRAME);
        while remaining > 0.0 {
            let dt = remaining.min(STEP);
            let force = -self.spring.stiffness * (self.scale - 1.0) - self.spring.damping * self.velocity;
            self.velocity += force / self.spring.mass * dt;
            self.scale += self.velocity * dt;
            remaining -= dt;
        }

        if (self.scale - 1.0).abs() < REST_DELTA && self.velocity.abs() < REST_SPEED {
            self.scale = 1.0;
            self.velocity = 0.0;
            self.running = false;
        }
    }

    /// Current scale; 1.0 when idle after a reveal
    pub fn scale(&self) -> f32 {
        if self.animated.is_some() {
            self.scale
        } else {
            1.0
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(reveal: &mut SizeReveal) -> usize {
        let mut frames = 0;
        while reveal.is_running() && frames < 600 {
            reveal.advance(Duration::from_millis(16));
            frames += 1;
        }
        frames
    }

    #[test]
    fn starts_at_zero_and_settles_at_one() {
        let mut reveal = SizeReveal::new(Spring::default());
        assert!(reveal.observe(Some("M")));
        assert_eq!(reveal.scale(), 0.0);

        let frames = settle(&mut reveal);
        assert!(frames < 600, "spring never settled");
        assert_eq!(reveal.scale(), 1.0);
    }

    #[test]
    fn same_value_animates_once() {
        let mut reveal = SizeReveal::new(Spring::default());
        assert!(reveal.observe(Some("M")));
        settle(&mut reveal);

        assert!(!reveal.observe(Some("M")));
        assert!(!reveal.is_running());
        assert_eq!(reveal.scale(), 1.0);
    }

    #[test]
    fn absent_value_does_nothing() {
        let mut reveal = SizeReveal::new(Spring::default());
        assert!(!reveal.observe(None));
        assert!(!reveal.is_running());
        assert_eq!(reveal.scale(), 1.0);
    }

    #[test]
    fn new_mount_animates_again() {
        let mut first = SizeReveal::new(Spring::default());
        first.observe(Some("L"));
        settle(&mut first);

        let mut remount = SizeReveal::new(Spring::default());
        assert!(remount.observe(Some("L")));
    }

    #[test]
    fn scale_grows_early_on() {
        let mut reveal = SizeReveal::new(Spring::default());
        reveal.observe(Some("S"));
        reveal.advance(Duration::from_millis(16));
        let early = reveal.scale();
        reveal.advance(Duration::from_millis(16));
        assert!(early > 0.0);
        assert!(reveal.scale() > early);
    }
}
