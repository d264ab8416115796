//! Procedural face animation for Abi.
//!
//! Each face feature (two eyes, one mouth) owns a square canvas and an
//! [`ExpressionAnimator`] that cycles `Idle → Active → Finished → Idle`.
//! While active, the selected expression is redrawn from the base look every
//! tick and cut progressively deeper until it reports completion.
//!
//! # Quick start
//!
//! ```no_run
//! use abi_config::FaceConfig;
//! use abi_core::input::{FaceKey, InputSnapshot};
//! use abi_face::FaceController;
//!
//! let mut face = FaceController::from_config(&FaceConfig::default());
//! let input = InputSnapshot::with_keys(&[FaceKey::EyeAngry]);
//! face.tick(&input, &mut rand::rng());
//! let _frame = face.render();
//! ```

pub mod animator;
pub mod canvas;
pub mod controller;
pub mod expression;

pub use animator::{AnimationState, ExpressionAnimator, FeatureSpec, TickOutcome};
pub use canvas::{BaseLook, Canvas, KEY};
pub use controller::FaceController;
pub use expression::{Expression, ExpressionKind, GeometryFn, GeometryParams, Mien};
