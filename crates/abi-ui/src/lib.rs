//! Terminal presentation of the face: layout, post-processing and the two
//! display backends.

pub mod face;
pub mod graphics;
pub mod iterm;
pub mod layout;
pub mod post;
pub mod status;
