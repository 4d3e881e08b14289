//! Adaptive ring generator.
//!
//! Grows a mesh outward ring by ring, choosing each ring's point count so
//! the angular sampling pitch stays consistent with a target object height,
//! and stitching every new ring onto the previous one. Growth is split-only:
//! a parent node emits one child, or two when the ring needs to densify at
//! its position.

use crate::error::GenerateError;
use crate::mesh::{unit_ray, Mesh, Node, Ring};
use crate::traits::{Scalar, Shape};
use anyhow::{bail, Result};
use std::f64::consts::FRAC_PI_2;

mod growth;
mod winding;

use growth::{reference_counts, GrowthPlan};
pub use winding::Winding;

/// Neighbour slots of the generator's node layout; slots 4 and 5 duplicate
/// BELOW so the node carries a full fixed-arity neighbour set.
const LEFT: usize = 0;
const TOP: usize = 1;
const RIGHT: usize = 2;
const BELOW: usize = 3;

/// Safety bounds against runaway generation from a malformed shape.
pub(crate) const MAX_RINGS: usize = 1 << 16;
pub(crate) const MAX_NODES: usize = 1 << 26;

/// Descriptor of the innermost ring the generator starts from. The seed
/// nodes share one polar angle and treat the node across the pole as their
/// below-neighbour.
#[derive(Debug, Clone, Copy)]
struct SeedRing {
    point_count: usize,
}

const SEED: SeedRing = SeedRing { point_count: 4 };

impl SeedRing {
    fn below_of(&self, j: usize) -> usize {
        (j + self.point_count / 2) % self.point_count
    }
}

/// Generates the sampling mesh for `shape` as seen from height `h`.
///
/// `k` controls radial resolution (rings per unit of normalized radius);
/// generation stops with the first ring whose projected ground distance
/// reaches `max_distance`. The returned mesh is complete and immutable:
/// every neighbour index resolves, each ring closes on itself, and the
/// boundary ring's TOP links self-loop to signal "no further ring".
pub fn generate<T: Scalar, S: Shape<T>>(
    shape: &S,
    h: T,
    k: usize,
    max_distance: T,
) -> Result<Mesh<T, 6>> {
    check_params(h, k, max_distance)?;

    let mut nodes: Vec<Node<T, 6>> = Vec::new();
    let mut rings: Vec<Ring<T>> = Vec::new();
    emit_seed(shape, h, k, &mut nodes, &mut rings)?;

    let reference = reference_counts(k);
    let mut winding = Winding::first();
    let mut prev_phi = rings[0].phi;
    let mut v = 1usize;

    loop {
        if rings.len() >= MAX_RINGS {
            bail!(GenerateError::RingBudgetExhausted { limit: MAX_RINGS });
        }

        let phi_next = ring_phi(shape, v, k, h, Some(prev_phi))?;
        let now = rings.last().expect("seed ring exists").point_count();
        let target = if v < k {
            reference[v]
        } else {
            ring_target(shape, phi_next, h, k)?
        };

        let plan = GrowthPlan::decide(now, target);
        let theta_next: T = plan.theta_step();

        let begin = nodes.len() - now;
        let end = nodes.len();
        if end + plan.point_count > MAX_NODES {
            bail!(GenerateError::NodeBudgetExhausted {
                limit: MAX_NODES,
                nodes: end + plan.point_count,
            });
        }

        let mut schedule = plan.schedule();
        let mut rel_next = 0usize;
        for (rel_now, parent) in parent_order(v, begin, end).into_iter().enumerate() {
            let child = end + rel_next;
            nodes.push(child_node(
                phi_next,
                theta_next,
                winding,
                rel_next,
                plan.point_count,
                end,
                parent,
            ));
            nodes[parent].neighbours[TOP] = child;
            rel_next += 1;

            if schedule.should_split(rel_now) {
                // A split parent's second child sits in the next azimuthal
                // slot; the parent's TOP keeps the first child and BELOW is
                // the authoritative parent link for both.
                nodes.push(child_node(
                    phi_next,
                    theta_next,
                    winding,
                    rel_next,
                    plan.point_count,
                    end,
                    parent,
                ));
                rel_next += 1;
            }
        }
        debug_assert_eq!(
            rel_next, plan.point_count,
            "ring {} emitted {} nodes but planned {}",
            v, rel_next, plan.point_count
        );
        debug_assert_eq!(
            schedule.splits_done(),
            plan.splits,
            "ring {} spent a different number of splits than planned",
            v
        );

        rings.push(Ring {
            begin: end,
            end: end + plan.point_count,
            phi: phi_next,
            theta: theta_next,
        });

        if reached_stop(h, phi_next, max_distance) {
            break;
        }
        prev_phi = phi_next;
        winding = winding.flipped();
        v += 1;
    }

    Ok(Mesh { nodes, rings })
}

/// Emits the fixed seed ring: `SEED.point_count` nodes at even azimuthal
/// spacing, at half the polar angle of the first radial step. TOP starts as
/// a self-loop and is patched when ring 1 links back to its parents.
fn emit_seed<T: Scalar, S: Shape<T>>(
    shape: &S,
    h: T,
    k: usize,
    nodes: &mut Vec<Node<T, 6>>,
    rings: &mut Vec<Ring<T>>,
) -> Result<()> {
    let two = T::from_f64(2.0).unwrap();
    let phi_seed = ring_phi(shape, 1, k, h, None)? / two;
    let theta_seed = T::from_f64(2.0 * std::f64::consts::PI).unwrap()
        / T::from_usize(SEED.point_count).unwrap();

    for j in 0..SEED.point_count {
        let azimuth = T::from_usize(j).unwrap() * theta_seed;
        let left = (j + 1) % SEED.point_count;
        let right = (j + SEED.point_count - 1) % SEED.point_count;
        let below = SEED.below_of(j);
        nodes.push(Node {
            ray: unit_ray(phi_seed, azimuth),
            neighbours: [left, j, right, below, below, below],
        });
    }
    rings.push(Ring {
        begin: 0,
        end: SEED.point_count,
        phi: phi_seed,
        theta: theta_seed,
    });
    Ok(())
}

/// One new node of the ring being generated. LEFT/RIGHT wrap over the new
/// ring's final count under the current winding; TOP self-loops until the
/// following ring patches it; slots 4 and 5 duplicate BELOW.
fn child_node<T: Scalar>(
    phi: T,
    theta: T,
    winding: Winding,
    rel: usize,
    count: usize,
    ring_start: usize,
    parent: usize,
) -> Node<T, 6> {
    let left = ring_start + winding.left_of(rel, count);
    let right = ring_start + winding.right_of(rel, count);
    Node {
        ray: unit_ray(phi, winding.azimuth(rel, theta)),
        neighbours: [left, ring_start + rel, right, parent, parent, parent],
    }
}

/// Order in which the parent ring `[begin, end)` is read while emitting its
/// children. The read order is rotated at the seam: ring 1 starts from its
/// first node, later rings from their second, with the remainder walked in
/// reverse so alternating windings keep adjacent rings aligned.
fn parent_order(v: usize, begin: usize, end: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(end - begin);
    if v == 1 {
        order.push(begin);
        order.extend((begin + 1..end).rev());
    } else {
        order.push(begin + 1);
        order.push(begin);
        order.extend((begin + 2..end).rev());
    }
    order
}

pub(crate) fn check_params<T: Scalar>(h: T, k: usize, max_distance: T) -> Result<()> {
    if k == 0 {
        bail!(GenerateError::ZeroRadialResolution);
    }
    if !h.is_finite() || h <= T::zero() {
        bail!(GenerateError::InvalidHeight(h.to_f64().unwrap_or(f64::NAN)));
    }
    if !max_distance.is_finite() || max_distance <= T::zero() {
        bail!(GenerateError::InvalidMaxDistance(
            max_distance.to_f64().unwrap_or(f64::NAN)
        ));
    }
    Ok(())
}

/// Polar angle of ring `v`, guarded against ill-behaved shapes: the value
/// must be finite, above the previous ring's angle, and short of the
/// horizon (a ring at or past the horizon can never reach a finite ground
/// distance).
pub(crate) fn ring_phi<T: Scalar, S: Shape<T>>(
    shape: &S,
    v: usize,
    k: usize,
    h: T,
    previous: Option<T>,
) -> Result<T> {
    let step = T::from_usize(v).unwrap() / T::from_usize(k).unwrap();
    let phi = shape.phi(step, h);
    if !phi.is_finite() {
        bail!(GenerateError::NonFinitePolarAngle {
            v: step.to_f64().unwrap_or(f64::NAN),
        });
    }
    if let Some(previous) = previous {
        if phi <= previous {
            bail!(GenerateError::NonMonotonicPolarAngle {
                v: step.to_f64().unwrap_or(f64::NAN),
                phi: phi.to_f64().unwrap_or(f64::NAN),
                previous: previous.to_f64().unwrap_or(f64::NAN),
            });
        }
    }
    if phi >= T::from_f64(FRAC_PI_2).unwrap() {
        bail!(GenerateError::HorizonReached {
            v: step.to_f64().unwrap_or(f64::NAN),
            phi: phi.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(phi)
}

/// Target point count at polar angle `phi`: enough points that the angular
/// spacing between adjacent samples does not exceed the shape's required
/// resolution.
pub(crate) fn ring_target<T: Scalar, S: Shape<T>>(
    shape: &S,
    phi: T,
    h: T,
    k: usize,
) -> Result<usize> {
    let theta = shape.theta(phi, h);
    if !theta.is_finite() || theta <= T::zero() {
        bail!(GenerateError::InvalidAngularResolution {
            theta: theta.to_f64().unwrap_or(f64::NAN),
            phi: phi.to_f64().unwrap_or(f64::NAN),
        });
    }
    let tau = T::from_f64(2.0 * std::f64::consts::PI).unwrap();
    let target = (tau * T::from_usize(k).unwrap() / theta).ceil();
    Ok(target.to_usize().unwrap_or(usize::MAX))
}

/// Whether the ring at polar angle `phi` projects to at least the stopping
/// ground distance.
pub(crate) fn reached_stop<T: Scalar>(h: T, phi: T, max_distance: T) -> bool {
    h * phi.tan() >= max_distance
}
