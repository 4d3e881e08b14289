//! Fixed-degree neighbour-index models.
//!
//! These resolve a node's neighbours when the point counts of the previous,
//! current, and next ring are already fixed by other means, independently of
//! the adaptive generator's inline linking. Offsets are expressed relative
//! to the start of the node's own ring: left/right land inside the current
//! ring, top entries are shifted by `+c` into the following ring, bottom
//! entries by `-p` into the preceding one, matching the flat ring layout.

use crate::error::GenerateError;
use crate::generator::{check_params, reached_stop, ring_phi, ring_target, MAX_NODES, MAX_RINGS};
use crate::mesh::{unit_ray, Mesh, Node, Ring};
use crate::traits::{Scalar, Shape};
use anyhow::{bail, Result};
use std::f64::consts::PI;

/// Eight-neighbour ring model.
pub struct Ring8;

impl Ring8 {
    pub const N_NEIGHBOURS: usize = 8;

    /// Neighbour offsets for the point at index `i` of a ring of `c`
    /// points, between rings of `p` (previous) and `n` (next) points,
    /// in clockwise order `{l, tl, t, tr, r, br, b, bl}`.
    ///
    /// All three counts must be positive; a zero count is a caller error,
    /// not a recoverable condition.
    pub fn neighbours(i: usize, p: usize, c: usize, n: usize) -> [isize; 8] {
        debug_assert!(p > 0 && c > 0 && n > 0, "ring point counts must be positive");
        debug_assert!(i < c, "index {i} outside ring of {c} points");

        // How far around the ring we are, as a value between 0 and 1.
        let f = i as f64 / c as f64;

        // Left and right are index -/+ 1 with wraparound in our own ring.
        let l = if i > 0 { i - 1 } else { c - 1 };
        let r = if i + 1 < c { i + 1 } else { 0 };

        // Top is the closest point in the next ring out, tl/tr one step
        // around it each way.
        let t = (f * n as f64).round() as usize % n;
        let tl = (t + n - 1) % n;
        let tr = (t + 1) % n;

        // Bottom is the closest point in the previous ring, bl/br likewise.
        let b = (f * p as f64).round() as usize % p;
        let bl = (b + p - 1) % p;
        let br = (b + 1) % p;

        let (c, p) = (c as isize, p as isize);
        [
            l as isize,
            tl as isize + c,
            t as isize + c,
            tr as isize + c,
            r as isize,
            br as isize - p,
            b as isize - p,
            bl as isize - p,
        ]
    }
}

/// Six-neighbour ring model: the Ring8 set without the tr/bl diagonal
/// pair, in clockwise order `{l, tl, t, r, br, b}`.
pub struct Ring6;

impl Ring6 {
    pub const N_NEIGHBOURS: usize = 6;

    /// Neighbour offsets for the point at index `i`; same contract as
    /// [`Ring8::neighbours`].
    pub fn neighbours(i: usize, p: usize, c: usize, n: usize) -> [isize; 6] {
        let [l, tl, t, _tr, r, br, b, _bl] = Ring8::neighbours(i, p, c, n);
        [l, tl, t, r, br, b]
    }
}

/// Builds a mesh of uniformly spaced rings wired through
/// [`Ring8::neighbours`].
///
/// Every ring gets the point count the projection model asks for at its
/// polar angle (clamped so counts never shrink), with nodes spaced evenly
/// in azimuth. Boundary rings reuse the generator's conventions: the
/// innermost ring's bottom links resolve through the pole to the antipodal
/// node of the same ring, and the outermost ring's top links self-loop.
pub fn uniform_lattice<T: Scalar, S: Shape<T>>(
    shape: &S,
    h: T,
    k: usize,
    max_distance: T,
) -> Result<Mesh<T, 8>> {
    check_params(h, k, max_distance)?;

    // Decide every ring's angle and point count up front so each ring
    // knows its neighbours' counts while wiring.
    let mut phis: Vec<T> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut total = 0usize;
    loop {
        if phis.len() >= MAX_RINGS {
            bail!(GenerateError::RingBudgetExhausted { limit: MAX_RINGS });
        }
        let v = phis.len() + 1;
        let phi = ring_phi(shape, v, k, h, phis.last().copied())?;
        let target = ring_target(shape, phi, h, k)?;
        let count = counts.last().map_or(target, |&previous| target.max(previous));
        total = total.saturating_add(count);
        if total > MAX_NODES {
            bail!(GenerateError::NodeBudgetExhausted {
                limit: MAX_NODES,
                nodes: total,
            });
        }
        phis.push(phi);
        counts.push(count);
        if reached_stop(h, phi, max_distance) {
            break;
        }
    }

    let last_ring = counts.len() - 1;
    let mut nodes: Vec<Node<T, 8>> = Vec::with_capacity(total);
    let mut rings: Vec<Ring<T>> = Vec::with_capacity(counts.len());
    let mut begin = 0usize;

    for (ri, (&count, &phi)) in counts.iter().zip(&phis).enumerate() {
        let p = if ri == 0 { count } else { counts[ri - 1] };
        let n = if ri == last_ring { count } else { counts[ri + 1] };
        let theta = T::from_f64(2.0 * PI).unwrap() / T::from_usize(count).unwrap();

        for i in 0..count {
            let offsets = Ring8::neighbours(i, p, count, n);
            let mut neighbours = [0usize; 8];
            for (slot, &offset) in offsets.iter().enumerate() {
                neighbours[slot] = if ri == 0 && slot >= 5 {
                    // Through-pole adjacency: undo the -p shift (p == count
                    // here) and jump half the ring around.
                    let rel = (offset + count as isize) as usize;
                    begin + (rel + count / 2) % count
                } else if ri == last_ring && (1..=3).contains(&slot) {
                    // Boundary sentinel: no outer ring to link to.
                    begin + i
                } else {
                    (begin as isize + offset) as usize
                };
            }
            nodes.push(Node {
                ray: unit_ray(phi, T::from_usize(i).unwrap() * theta),
                neighbours,
            });
        }

        rings.push(Ring {
            begin,
            end: begin + count,
            phi,
            theta,
        });
        begin += count;
    }

    Ok(Mesh { nodes, rings })
}

#[cfg(test)]
mod tests {
    use super::{uniform_lattice, Ring6, Ring8};
    use crate::mesh::SlotLayout;
    use crate::traits::Shape;

    #[test]
    fn uniform_lattice_offsets_are_symmetric() {
        // On a uniform 8-point lattice the first node's closest points
        // above and below sit straight across, diagonals one step around.
        let [l, tl, t, tr, r, br, b, bl] = Ring8::neighbours(0, 8, 8, 8);
        assert_eq!(l, 7);
        assert_eq!(r, 1);
        assert_eq!([tl, t, tr], [7 + 8, 8, 1 + 8]);
        assert_eq!([br, b, bl], [1 - 8, -8, 7 - 8]);
    }

    #[test]
    fn offsets_land_in_the_adjacent_ring_ranges() {
        let (p, c, n) = (4usize, 8usize, 16usize);
        for i in 0..c {
            let offsets = Ring8::neighbours(i, p, c, n);
            let [l, tl, t, tr, r, br, b, bl] = offsets;
            for side in [l, r] {
                assert!((0..c as isize).contains(&side));
            }
            for top in [tl, t, tr] {
                assert!((c as isize..(c + n) as isize).contains(&top));
            }
            for bottom in [br, b, bl] {
                assert!((-(p as isize)..0).contains(&bottom));
            }
        }
    }

    #[test]
    fn closest_outer_point_tracks_the_ring_fraction() {
        // Halfway around a ring of 4 maps to halfway around a ring of 8.
        let t = Ring8::neighbours(2, 4, 4, 8)[2] - 4;
        assert_eq!(t, 4);
        // And to the matching point of a denser previous ring.
        let b = Ring8::neighbours(2, 12, 4, 4)[6] + 12;
        assert_eq!(b, 6);
    }

    #[test]
    fn ring6_omits_one_diagonal_pair() {
        let eight = Ring8::neighbours(3, 8, 8, 8);
        let six = Ring6::neighbours(3, 8, 8, 8);
        assert_eq!(six, [eight[0], eight[1], eight[2], eight[4], eight[5], eight[6]]);
        assert_eq!(Ring6::N_NEIGHBOURS, 6);
    }

    struct WidePitchShape;

    impl Shape<f64> for WidePitchShape {
        fn phi(&self, v: f64, _h: f64) -> f64 {
            1.2 * (1.0 - (-v).exp())
        }

        fn theta(&self, phi: f64, _h: f64) -> f64 {
            0.8 / (1.0 + phi)
        }
    }

    #[test]
    fn lattice_mesh_satisfies_structural_invariants() {
        let mesh = uniform_lattice(&WidePitchShape, 1.0, 3, 2.0).expect("lattice");
        assert!(mesh.ring_count() > 2);
        mesh.validate(SlotLayout::RING8)
            .expect("lattice mesh should validate");
    }

    #[test]
    fn lattice_termination_brackets_the_stopping_distance() {
        let (h, max_distance) = (1.0, 2.0);
        let mesh = uniform_lattice(&WidePitchShape, h, 3, max_distance).expect("lattice");
        let last = mesh.outermost();
        let second_last = &mesh.rings[mesh.ring_count() - 2];
        assert!(h * last.phi.tan() >= max_distance);
        assert!(h * second_last.phi.tan() < max_distance);
    }

    #[test]
    fn lattice_inner_ring_links_through_the_pole() {
        let mesh = uniform_lattice(&WidePitchShape, 1.0, 3, 2.0).expect("lattice");
        let inner = &mesh.rings[0];
        let count = inner.point_count();
        for i in 0..count {
            let b = mesh.nodes[inner.begin + i].neighbours[6];
            assert_eq!(b, inner.begin + (i + count / 2) % count);
        }
    }

    #[test]
    fn lattice_rejects_bad_parameters() {
        let result = uniform_lattice(&WidePitchShape, 1.0, 0, 2.0);
        let message = format!("{}", result.expect_err("k = 0 should fail"));
        assert!(message.contains("radial resolution"));
    }
}
