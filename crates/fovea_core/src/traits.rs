use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars in mesh generation.
/// Must support basic arithmetic, debug printing, and conversion from f64.
/// `f32` and `f64` are the intended instantiations; the choice only affects
/// precision and rounding, never the graph structure contract.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// The projection model consumed by the mesh generators.
///
/// Implementations describe how an object of height `h` projects into the
/// field of view. Both functions must be pure and side-effect free:
/// `phi` monotonically increasing in `v` over the domain used, `theta`
/// strictly positive and finite. The generators treat the model as a black
/// box and guard against violations at runtime.
pub trait Shape<T: Scalar> {
    /// Polar angle (radians) from the optical axis for normalized radial
    /// step `v` and object height `h`.
    fn phi(&self, v: T, h: T) -> T;

    /// Minimum angular separation between adjacent samples at polar angle
    /// `phi` for object height `h`.
    fn theta(&self, phi: T, h: T) -> T;
}
