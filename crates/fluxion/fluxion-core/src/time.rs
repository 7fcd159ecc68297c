//! Tick sources fed to [`Engine::tick`](crate::Engine::tick).

/// Reports the seconds elapsed since it was last asked.
pub trait TimeSource {
    fn delta_time(&mut self) -> f32;
}

impl<F> TimeSource for F
where
    F: FnMut() -> f32,
{
    #[inline]
    fn delta_time(&mut self) -> f32 {
        self()
    }
}

/// Same step every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    step: f32,
}

impl FixedStep {
    pub fn new(step: f32) -> Self {
        Self { step }
    }

    /// Step for a target frame rate.
    pub fn from_fps(fps: f32) -> Self {
        Self::new(if fps > 0.0 { 1.0 / fps } else { 0.0 })
    }

    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::from_fps(60.0)
    }
}

impl TimeSource for FixedStep {
    #[inline]
    fn delta_time(&mut self) -> f32 {
        self.step
    }
}

/// Accumulates time pushed by the host and hands it out once.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    pending: f32,
    total: f32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, seconds: f32) {
        self.pending += seconds.max(0.0);
    }

    /// Time handed out so far.
    #[inline]
    pub fn total(&self) -> f32 {
        self.total
    }
}

impl TimeSource for ManualClock {
    fn delta_time(&mut self) -> f32 {
        let dt = std::mem::take(&mut self.pending);
        self.total += dt;
        dt
    }
}
