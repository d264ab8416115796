//! Configuration schema and loader for the Abi face.
//!
//! All face geometry is fixed for the life of the process; this crate is
//! where those fixed parameters are declared, defaulted, and validated.

pub mod face;

pub use face::{
    BloomConfig, EyesConfig, FaceConfig, FrameConfig, JitterConfig, MouthConfig, PaletteConfig,
    TimingConfig,
};
