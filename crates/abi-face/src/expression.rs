//! Expression kinds and their procedural geometry.
//!
//! Each kind maps through a fixed table to an optional geometry routine.
//! A routine draws onto a canvas that already holds the base look and
//! reports whether the expression has finished animating.

use std::fmt;

use abi_core::input::{FaceKey, InputSnapshot};

use crate::canvas::{BaseLook, Canvas, Point, KEY};

/// Everything a geometry routine may read for one frame.
#[derive(Debug, Clone, Copy)]
pub struct GeometryParams {
    /// Outer radius `R`; the canvas is `2R` wide.
    pub radius: u32,
    pub progress: u32,
    pub mirrored: bool,
    pub look: BaseLook,
}

/// Draws one frame of an expression and returns `true` once it is complete.
pub type GeometryFn = fn(&mut Canvas, &GeometryParams) -> bool;

/// A selectable animation variant for one kind of feature.
pub trait ExpressionKind: Copy + Eq + fmt::Debug + 'static {
    /// All variants in selection-priority order.
    const ALL: &'static [Self];

    /// The key that requests this variant.
    fn key(self) -> FaceKey;

    /// Routine that draws this variant, or `None` when none exists yet.
    fn geometry(self) -> Option<GeometryFn>;

    /// The selector key this kind of feature listens to in `input`.
    fn selector(input: &InputSnapshot) -> Option<FaceKey>;

    /// The variant requested in `input`, if any.
    fn requested(input: &InputSnapshot) -> Option<Self> {
        let key = Self::selector(input)?;
        Self::ALL.iter().copied().find(|k| k.key() == key)
    }
}

/// Eye expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expression {
    Neutral = 0,
    Sad = 1,
    Angry = 2,
    Bored = 3,
}

impl Expression {
    pub const COUNT: usize = 4;
}

const EYE_GEOMETRY: [GeometryFn; Expression::COUNT] = [neutral, sad, angry, bored];

impl ExpressionKind for Expression {
    const ALL: &'static [Self] = &[
        Expression::Neutral,
        Expression::Sad,
        Expression::Angry,
        Expression::Bored,
    ];

    fn key(self) -> FaceKey {
        match self {
            Expression::Neutral => FaceKey::EyeNeutral,
            Expression::Sad => FaceKey::EyeSad,
            Expression::Angry => FaceKey::EyeAngry,
            Expression::Bored => FaceKey::EyeBored,
        }
    }

    fn selector(input: &InputSnapshot) -> Option<FaceKey> {
        input.expression_request()
    }

    fn geometry(self) -> Option<GeometryFn> {
        Some(EYE_GEOMETRY[self as usize])
    }
}

/// Mouth shapes ("miens").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mien {
    Open = 0,
    Closed = 1,
    OpenSmile = 2,
    ClosedSmile = 3,
    ClosedSad = 4,
    OpenSad = 5,
}

impl Mien {
    pub const COUNT: usize = 6;
}

// TODO: ClosedSmile, ClosedSad and OpenSad still need shapes; pick between
// reusing the eyelid quad cut and drawing curved lips.
const MIEN_GEOMETRY: [Option<GeometryFn>; Mien::COUNT] = [
    Some(mouth_open),
    Some(mouth_closed),
    Some(mouth_open_smile),
    None,
    None,
    None,
];

impl ExpressionKind for Mien {
    const ALL: &'static [Self] = &[
        Mien::Open,
        Mien::Closed,
        Mien::OpenSmile,
        Mien::ClosedSmile,
        Mien::ClosedSad,
        Mien::OpenSad,
    ];

    fn key(self) -> FaceKey {
        match self {
            Mien::Open => FaceKey::MouthOpen,
            Mien::Closed => FaceKey::MouthClosed,
            Mien::OpenSmile => FaceKey::MouthOpenSmile,
            Mien::ClosedSmile => FaceKey::MouthClosedSmile,
            Mien::ClosedSad => FaceKey::MouthClosedSad,
            Mien::OpenSad => FaceKey::MouthOpenSad,
        }
    }

    fn selector(input: &InputSnapshot) -> Option<FaceKey> {
        input.mien_request()
    }

    fn geometry(self) -> Option<GeometryFn> {
        MIEN_GEOMETRY[self as usize]
    }
}

fn lid_done(p: &GeometryParams) -> bool {
    p.progress >= p.radius
}

fn neutral(_canvas: &mut Canvas, _p: &GeometryParams) -> bool {
    true
}

/// Eyelid closing from the top down.
fn bored(canvas: &mut Canvas, p: &GeometryParams) -> bool {
    let width = 2.0 * p.radius as f64;
    canvas.draw_rect(KEY, (0.0, 0.0), (width, p.progress as f64));
    lid_done(p)
}

fn angry(canvas: &mut Canvas, p: &GeometryParams) -> bool {
    canvas.draw_quad(KEY, slanted_lid(p, !p.mirrored));
    lid_done(p)
}

fn sad(canvas: &mut Canvas, p: &GeometryParams) -> bool {
    canvas.draw_quad(KEY, slanted_lid(p, p.mirrored));
    lid_done(p)
}

/// Lid quad whose lower edge sits at `progress` on the deep side and half a
/// radius higher on the other.
///
/// Early on the shallow end is above the canvas; the top edge is lifted with
/// it so the quad stays convex.
fn slanted_lid(p: &GeometryParams, deep_on_right: bool) -> [Point; 4] {
    let width = 2.0 * p.radius as f64;
    let deep = p.progress as f64;
    let shallow = deep - 0.5 * p.radius as f64;
    let top = shallow.min(0.0);
    let (left, right) = if deep_on_right {
        (shallow, deep)
    } else {
        (deep, shallow)
    };
    [(0.0, top), (width, top), (width, right), (0.0, left)]
}

/// The base disc is the open mouth.
fn mouth_open(_canvas: &mut Canvas, _p: &GeometryParams) -> bool {
    true
}

fn mouth_closed(canvas: &mut Canvas, p: &GeometryParams) -> bool {
    canvas.clear();
    let r = p.radius as f64;
    let half = (p.radius / 4).max(2) as f64 / 2.0;
    canvas.draw_rect(p.look.iris, (0.0, r - half), (2.0 * r, r + half));
    true
}

fn mouth_open_smile(canvas: &mut Canvas, p: &GeometryParams) -> bool {
    mouth_open(canvas, p);
    let r = p.radius as f64;
    canvas.draw_rect(KEY, (0.0, 0.0), (2.0 * r, r));
    true
}
