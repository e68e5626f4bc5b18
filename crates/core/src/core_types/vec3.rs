//! Vector type alias for wind vectors and renderer-space positions.

use nalgebra::Vector3;

/// 3D vector type for wind vectors `(u, v, w)` and projected positions.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, matching the single
/// precision of the vertex buffers handed to the renderer.
pub type Vec3 = Vector3<f32>;
