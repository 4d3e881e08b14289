//! Mesh data model: nodes, rings, and the flat graph they are carved from.
//!
//! A mesh is produced by one generation pass and is immutable afterwards.
//! Nodes reference each other exclusively through indices into the flat
//! node list, so the graph is cycle-safe and can be uploaded to downstream
//! execution engines as-is.

use crate::traits::Scalar;
use anyhow::{bail, ensure, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One sample point: a unit ray direction from the optical centre plus a
/// fixed-arity array of neighbour indices.
///
/// The adaptive generator emits `Node<T, 6>`; the uniform Ring8 lattice
/// emits `Node<T, 8>`. The meaning of each neighbour slot is described by a
/// [`SlotLayout`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, [usize; N]: Serialize",
    deserialize = "T: Deserialize<'de>, [usize; N]: Deserialize<'de>"
))]
pub struct Node<T: Scalar, const N: usize> {
    /// Direction of the sample point, unit length.
    pub ray: Vector3<T>,
    /// Indices into the flat node list, never dangling in a finished mesh.
    pub neighbours: [usize; N],
}

/// A maximal contiguous block `[begin, end)` of nodes sharing one polar
/// angle from the optical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ring<T: Scalar> {
    pub begin: usize,
    pub end: usize,
    /// Polar angle shared by every node in the ring.
    pub phi: T,
    /// Angular step used to space the ring's nodes.
    pub theta: T,
}

impl<T: Scalar> Ring<T> {
    pub fn point_count(&self) -> usize {
        self.end - self.begin
    }

    pub fn contains(&self, index: usize) -> bool {
        self.begin <= index && index < self.end
    }
}

/// Names the positions of the four directional links within a node's
/// neighbour array. Each neighbour model stores its links in a different
/// clockwise order, so structural checks take the layout as an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub below: usize,
}

impl SlotLayout {
    /// Layout used by the adaptive generator: L, T, R, B, with slots 4 and 5
    /// duplicating B.
    pub const ADAPTIVE: SlotLayout = SlotLayout {
        left: 0,
        top: 1,
        right: 2,
        below: 3,
    };

    /// Clockwise Ring8 layout: L, TL, T, TR, R, BR, B, BL.
    pub const RING8: SlotLayout = SlotLayout {
        left: 0,
        top: 2,
        right: 4,
        below: 6,
    };

    /// Clockwise Ring6 layout: L, TL, T, R, BR, B.
    pub const RING6: SlotLayout = SlotLayout {
        left: 0,
        top: 2,
        right: 3,
        below: 5,
    };
}

/// Ordered rings (ring 0 innermost) plus the flat node list they index into.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, [usize; N]: Serialize",
    deserialize = "T: Deserialize<'de>, [usize; N]: Deserialize<'de>"
))]
pub struct Mesh<T: Scalar, const N: usize> {
    pub nodes: Vec<Node<T, N>>,
    pub rings: Vec<Ring<T>>,
}

impl<T: Scalar, const N: usize> Mesh<T, N> {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// The nodes of ring `r`.
    pub fn ring_nodes(&self, r: usize) -> &[Node<T, N>] {
        let ring = &self.rings[r];
        &self.nodes[ring.begin..ring.end]
    }

    /// The boundary ring at the largest polar angle.
    pub fn outermost(&self) -> &Ring<T> {
        self.rings.last().expect("a mesh always has a seed ring")
    }

    /// Checks the structural invariants every finished mesh must satisfy:
    /// contiguous ring ranges, in-bounds neighbour indices, LEFT/RIGHT
    /// closure as a simple cycle within each ring, the self-loop TOP
    /// sentinel on the boundary ring, and non-shrinking ring point counts.
    ///
    /// Downstream consumers trust neighbour indices unconditionally, so
    /// anything ingesting a mesh across a trust boundary should call this.
    pub fn validate(&self, slots: SlotLayout) -> Result<()> {
        ensure!(!self.rings.is_empty(), "mesh has no rings");
        ensure!(
            self.rings[0].begin == 0,
            "ring 0 must start at node 0, starts at {}",
            self.rings[0].begin
        );
        for (r, ring) in self.rings.iter().enumerate() {
            ensure!(
                ring.begin < ring.end,
                "ring {} is empty ([{}, {}))",
                r,
                ring.begin,
                ring.end
            );
            if r > 0 {
                ensure!(
                    ring.begin == self.rings[r - 1].end,
                    "ring {} does not start where ring {} ends",
                    r,
                    r - 1
                );
                ensure!(
                    ring.point_count() >= self.rings[r - 1].point_count(),
                    "ring {} shrank from {} to {} points",
                    r,
                    self.rings[r - 1].point_count(),
                    ring.point_count()
                );
            }
        }
        ensure!(
            self.outermost().end == self.nodes.len(),
            "rings cover {} nodes but the mesh has {}",
            self.outermost().end,
            self.nodes.len()
        );

        for (i, node) in self.nodes.iter().enumerate() {
            for &neighbour in &node.neighbours {
                ensure!(
                    neighbour < self.nodes.len(),
                    "node {} has dangling neighbour index {}",
                    i,
                    neighbour
                );
            }
        }

        for (r, ring) in self.rings.iter().enumerate() {
            self.check_ring_cycle(r, ring, slots.left)?;
            self.check_ring_cycle(r, ring, slots.right)?;
        }

        let boundary = self.outermost();
        for i in boundary.begin..boundary.end {
            ensure!(
                self.nodes[i].neighbours[slots.top] == i,
                "boundary node {} points above itself instead of self-looping",
                i
            );
        }

        Ok(())
    }

    /// Follows `slot` around `ring`: the walk must stay inside the ring,
    /// visit every node once, and return to its start.
    fn check_ring_cycle(&self, r: usize, ring: &Ring<T>, slot: usize) -> Result<()> {
        let count = ring.point_count();
        let mut seen = vec![false; count];
        let mut current = ring.begin;
        for step in 0..count {
            if !ring.contains(current) {
                bail!(
                    "ring {} walk left the ring at step {} (node {})",
                    r,
                    step,
                    current
                );
            }
            if seen[current - ring.begin] {
                bail!("ring {} walk revisited node {} before closing", r, current);
            }
            seen[current - ring.begin] = true;
            current = self.nodes[current].neighbours[slot];
        }
        ensure!(
            current == ring.begin,
            "ring {} walk of {} steps ended at node {} instead of node {}",
            r,
            count,
            current,
            ring.begin
        );
        Ok(())
    }
}

/// Spherical-to-Cartesian conversion with the optical axis pointing down:
/// x forward, y left, z up, so a ray at polar angle zero is straight down.
pub(crate) fn unit_ray<T: Scalar>(phi: T, theta: T) -> Vector3<T> {
    Vector3::new(
        theta.cos() * phi.sin(),
        theta.sin() * phi.sin(),
        -phi.cos(),
    )
}
