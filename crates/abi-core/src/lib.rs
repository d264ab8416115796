//! Shared infrastructure for the Abi face runtime.
//!
//! Pieces shared by the animation core and the terminal frame loop. The
//! face only ever sees input through an [`input::InputSnapshot`].

pub mod input;
pub mod logging;
pub mod rate;
