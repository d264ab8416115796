use abi_config::JitterConfig;
use rand::Rng;

use crate::canvas::{BaseLook, Canvas};
use crate::expression::{ExpressionKind, GeometryParams};

/// Lifecycle of one feature's expression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Showing the base look, waiting for a request.
    Idle,
    /// Running the selected expression's geometry.
    Active,
    /// Run complete; becomes `Idle` on the next tick.
    Finished,
}

/// Fixed parameters for one face feature.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    /// Screen-space center of the feature.
    pub anchor: (i32, i32),
    pub look: BaseLook,
    pub mirrored: bool,
    /// Progress added per active tick.
    pub step: u32,
}

/// What a single [`ExpressionAnimator::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub from: AnimationState,
    pub to: AnimationState,
    /// The running kind has no geometry routine; the canvas was left as is.
    pub missing_geometry: bool,
}

impl TickOutcome {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Per-feature expression state machine.
///
/// Owns the feature's canvas and redraws it in place each tick. Once a run
/// starts it always plays to completion; requests arriving meanwhile are
/// ignored.
pub struct ExpressionAnimator<E: ExpressionKind> {
    spec: FeatureSpec,
    canvas: Canvas,
    state: AnimationState,
    expression: Option<E>,
    progress: u32,
    anchor: (i32, i32),
    /// Where jitter drift is measured from; follows deliberate movement.
    home: (i32, i32),
    jitter: JitterConfig,
}

impl<E: ExpressionKind> ExpressionAnimator<E> {
    /// Create an idle animator showing the base look.
    pub fn new(spec: FeatureSpec, jitter: JitterConfig) -> Self {
        let mut canvas = Canvas::new(2 * spec.look.iris_radius);
        canvas.reset_base(&spec.look);
        Self {
            spec,
            canvas,
            state: AnimationState::Idle,
            expression: None,
            progress: 0,
            anchor: spec.anchor,
            home: spec.anchor,
            jitter,
        }
    }

    /// Advance one tick.
    ///
    /// A request is only read while idle. Picking one up runs the first
    /// active step in the same tick.
    pub fn tick<R: Rng>(&mut self, request: Option<E>, rng: &mut R) -> TickOutcome {
        let from = self.state;
        let mut missing_geometry = false;

        match self.state {
            AnimationState::Idle => match request {
                Some(kind) => {
                    self.expression = Some(kind);
                    self.progress = 0;
                    self.state = AnimationState::Active;
                    missing_geometry = self.step_active();
                }
                None => {
                    self.canvas.reset_base(&self.spec.look);
                    self.flicker(rng);
                }
            },
            AnimationState::Active => missing_geometry = self.step_active(),
            AnimationState::Finished => {
                self.progress = 0;
                self.state = AnimationState::Idle;
            }
        }

        TickOutcome {
            from,
            to: self.state,
            missing_geometry,
        }
    }

    /// One active frame. Returns `true` when the kind had no geometry.
    fn step_active(&mut self) -> bool {
        let Some(kind) = self.expression else {
            self.state = AnimationState::Finished;
            return false;
        };

        self.progress = self.progress.saturating_add(self.spec.step);

        let (complete, missing) = match kind.geometry() {
            Some(draw) => {
                self.canvas.reset_base(&self.spec.look);
                let params = self.params();
                (draw(&mut self.canvas, &params), false)
            }
            None => (true, true),
        };

        if complete {
            self.state = AnimationState::Finished;
        }
        missing
    }

    fn params(&self) -> GeometryParams {
        GeometryParams {
            radius: self.spec.look.iris_radius,
            progress: self.progress,
            mirrored: self.spec.mirrored,
            look: self.spec.look,
        }
    }

    /// Cosmetic ±1 wobble of the anchor while idle.
    fn flicker<R: Rng>(&mut self, rng: &mut R) {
        if !self.jitter.enabled {
            return;
        }
        let mut x = self.anchor.0 + rng.random_range(-1..=1);
        let mut y = self.anchor.1 + rng.random_range(-1..=1);
        if let Some(max) = self.jitter.max_drift {
            let max = max as i32;
            x = x.clamp(self.home.0 - max, self.home.0 + max);
            y = y.clamp(self.home.1 - max, self.home.1 + max);
        }
        self.anchor = (x, y);
    }

    /// Move the feature by a deliberate offset.
    pub fn nudge(&mut self, dx: i32, dy: i32) {
        self.anchor = (self.anchor.0 + dx, self.anchor.1 + dy);
        self.home = (self.home.0 + dx, self.home.1 + dy);
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// The running expression, or the last one run.
    pub fn expression(&self) -> Option<E> {
        self.expression
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn anchor(&self) -> (i32, i32) {
        self.anchor
    }

    pub fn radius(&self) -> u32 {
        self.spec.look.iris_radius
    }

    pub fn is_mirrored(&self) -> bool {
        self.spec.mirrored
    }

    /// Screen position of the canvas's top-left corner.
    pub fn top_left(&self) -> (i32, i32) {
        let r = self.radius() as i32;
        (self.anchor.0 - r, self.anchor.1 - r)
    }
}
