use abi_config::FaceConfig;
use abi_core::input::InputSnapshot;
use image::{imageops, Rgba, RgbaImage};
use rand::Rng;

use crate::animator::{ExpressionAnimator, FeatureSpec, TickOutcome};
use crate::canvas::{opaque, BaseLook};
use crate::expression::{Expression, ExpressionKind, Mien};

/// The whole face: two mirrored eyes and a mouth.
///
/// Consumers call [`tick`](Self::tick) once per animation tick with that
/// tick's input, then [`compose`](Self::compose) to paint the result.
pub struct FaceController {
    left_eye: ExpressionAnimator<Expression>,
    right_eye: ExpressionAnimator<Expression>,
    mouth: ExpressionAnimator<Mien>,
    move_step: i32,
    frame_size: (u32, u32),
    background: Rgba<u8>,
}

impl FaceController {
    /// Build the face from validated configuration.
    pub fn from_config(config: &FaceConfig) -> Self {
        let iris = opaque(config.palette.iris);
        let pupil = opaque(config.palette.pupil);
        let eye_look = BaseLook {
            iris,
            iris_radius: config.eyes.radius,
            pupil,
            pupil_radius: config.eyes.pupil_radius,
        };
        let eye = |name, [x, y]: [i32; 2], mirrored| FeatureSpec {
            name,
            anchor: (x, y),
            look: eye_look,
            mirrored,
            step: config.eyes.progress_step,
        };

        let [mx, my] = config.mouth.center;
        let mouth = FeatureSpec {
            name: "mouth",
            anchor: (mx, my),
            look: BaseLook {
                iris,
                iris_radius: config.mouth.radius,
                pupil,
                pupil_radius: 0,
            },
            mirrored: false,
            step: config.mouth.progress_step,
        };

        Self {
            left_eye: ExpressionAnimator::new(
                eye("left_eye", config.eyes.left_center, false),
                config.jitter.clone(),
            ),
            right_eye: ExpressionAnimator::new(
                eye("right_eye", config.eyes.right_center, true),
                config.jitter.clone(),
            ),
            mouth: ExpressionAnimator::new(mouth, config.jitter.clone()),
            move_step: config.eyes.move_step,
            frame_size: (config.frame.width, config.frame.height),
            background: opaque(config.frame.background),
        }
    }

    /// Apply one tick of input to every feature.
    ///
    /// Both eyes get the same movement and the same request, so they always
    /// run in phase. The mouth never moves.
    pub fn tick<R: Rng>(&mut self, input: &InputSnapshot, rng: &mut R) {
        let (dx, dy) = input.movement(self.move_step);
        if dx != 0 || dy != 0 {
            self.left_eye.nudge(dx, dy);
            self.right_eye.nudge(dx, dy);
        }

        let expression = Expression::requested(input);
        let mien = Mien::requested(input);

        let outcome = self.left_eye.tick(expression, rng);
        log_outcome(&self.left_eye, outcome);
        let outcome = self.right_eye.tick(expression, rng);
        log_outcome(&self.right_eye, outcome);
        let outcome = self.mouth.tick(mien, rng);
        log_outcome(&self.mouth, outcome);
    }

    /// Paint every feature onto `frame` at its current anchor.
    ///
    /// Eyes go first, the mouth last. Key-colored canvas pixels leave the
    /// frame untouched, and features hanging off the edge are clipped.
    pub fn compose(&self, frame: &mut RgbaImage) {
        overlay_feature(frame, &self.left_eye);
        overlay_feature(frame, &self.right_eye);
        overlay_feature(frame, &self.mouth);
    }

    /// A background-filled frame of the configured size.
    pub fn blank_frame(&self) -> RgbaImage {
        let (w, h) = self.frame_size;
        RgbaImage::from_pixel(w, h, self.background)
    }

    /// Blank frame with the face composited on it.
    pub fn render(&self) -> RgbaImage {
        let mut frame = self.blank_frame();
        self.compose(&mut frame);
        frame
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    pub fn left_eye(&self) -> &ExpressionAnimator<Expression> {
        &self.left_eye
    }

    pub fn right_eye(&self) -> &ExpressionAnimator<Expression> {
        &self.right_eye
    }

    pub fn mouth(&self) -> &ExpressionAnimator<Mien> {
        &self.mouth
    }
}

fn overlay_feature<E: ExpressionKind>(frame: &mut RgbaImage, feature: &ExpressionAnimator<E>) {
    let (x, y) = feature.top_left();
    imageops::overlay(frame, feature.canvas().image(), x as i64, y as i64);
}

fn log_outcome<E: ExpressionKind>(feature: &ExpressionAnimator<E>, outcome: TickOutcome) {
    if outcome.missing_geometry {
        tracing::warn!(
            feature = feature.name(),
            kind = ?feature.expression(),
            "no geometry for this shape; keeping previous frame"
        );
    }
    if outcome.changed() {
        tracing::debug!(
            feature = feature.name(),
            from = ?outcome.from,
            to = ?outcome.to,
            kind = ?feature.expression(),
            progress = feature.progress(),
            "state transition"
        );
    }
}
