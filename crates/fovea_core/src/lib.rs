//! The `fovea_core` crate builds graph-structured sampling meshes over a
//! projected field of view: unit-ray directions arranged in concentric
//! rings around a principal axis, wired with fixed-arity neighbour indices
//! into one flat node list that downstream sampling engines walk directly.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction over `f32`/`f64`) and
//!   `Shape` (the black-box projection model supplying `phi` and `theta`).
//! - **Generator**: the adaptive ring generator, which picks each ring's
//!   point count to hold a roughly constant sampling pitch on an object of
//!   known height and splits parent nodes where density must grow.
//! - **Models**: Ring6/Ring8 fixed-degree neighbour-index resolvers and a
//!   uniform lattice builder wired through them.
//! - **Mesh**: the node/ring data model plus structural validation.

pub mod error;
pub mod generator;
pub mod mesh;
pub mod model;
pub mod traits;

pub use error::GenerateError;
pub use generator::{generate, Winding};
pub use mesh::{Mesh, Node, Ring, SlotLayout};
pub use model::{uniform_lattice, Ring6, Ring8};
pub use traits::{Scalar, Shape};
