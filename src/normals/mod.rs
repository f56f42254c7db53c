//! Gradient, surface normal and normal map computation.
//!
//! Normals are derived from the raw (un-normalized) heightfield together with
//! the physical sample spacing, so slopes keep their real-world steepness.

mod gradient;
mod surface;
mod encode;

pub use gradient::gradient;
pub use surface::{surface_normals, NormalField};
pub use encode::{encode_normal, encode_normal_map, generate_normal_map, NormalMap};
