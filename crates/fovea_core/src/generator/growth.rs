//! Growth policy: how many points the next ring needs and which parents
//! split to provide them.
//!
//! Ring growth is one-directional. A ring can gain points relative to its
//! parent ring but never lose them, so a target density below the current
//! count is rejected and the count held flat.

use crate::traits::Scalar;
use std::f64::consts::PI;

/// Ideal point counts for the first rings of a uniformly subdividing
/// lattice. Growth inside the first `k` rings chases these targets before
/// the projection model takes over.
pub(crate) fn reference_counts(k: usize) -> Vec<usize> {
    let mut counts = vec![4, 8];
    while counts.len() < k {
        counts.push(12 + 8 * (counts.len() - 2));
    }
    counts
}

/// How parents are selected for splitting during one ring transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplitPolicy {
    /// No parent splits; the ring keeps its point count.
    Hold,
    /// Split each parent whose position is a multiple of `interval`, until
    /// the quota is spent.
    Spread { interval: usize },
    /// The quota exceeds half the ring: split every other parent until the
    /// remaining parents only just cover the remaining quota, then split
    /// every one.
    Saturate { threshold: usize },
    /// Every parent splits; the ring doubles.
    Double,
}

/// The realized growth decision for one ring transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GrowthPlan {
    /// Point count of the new ring.
    pub point_count: usize,
    /// Exact number of parents that split.
    pub splits: usize,
    pub policy: SplitPolicy,
}

impl GrowthPlan {
    /// Chooses the next ring's point count from the current count `now` and
    /// the target density.
    pub(crate) fn decide(now: usize, target: usize) -> GrowthPlan {
        let difference = target as isize - now as isize;
        if difference <= 0 {
            return GrowthPlan {
                point_count: now,
                splits: 0,
                policy: SplitPolicy::Hold,
            };
        }
        let difference = difference as usize;
        if difference == 1 {
            GrowthPlan {
                point_count: now + 1,
                splits: 1,
                policy: SplitPolicy::Spread { interval: 1 },
            }
        } else if difference < now {
            let interval = now / difference;
            let policy = if interval == 1 {
                SplitPolicy::Saturate {
                    threshold: now - difference,
                }
            } else {
                SplitPolicy::Spread { interval }
            };
            GrowthPlan {
                point_count: target,
                splits: difference,
                policy,
            }
        } else {
            GrowthPlan {
                point_count: 2 * now,
                splits: now,
                policy: SplitPolicy::Double,
            }
        }
    }

    /// Angular spacing between adjacent points of the new ring.
    pub(crate) fn theta_step<T: Scalar>(&self) -> T {
        T::from_f64(2.0 * PI).unwrap() / T::from_usize(self.point_count).unwrap()
    }

    pub(crate) fn schedule(&self) -> SplitSchedule {
        SplitSchedule {
            policy: self.policy,
            quota: self.splits,
            done: 0,
        }
    }
}

/// Walks the parent ring once, deciding split-or-not per position while
/// keeping the running split count exactly on quota.
#[derive(Debug)]
pub(crate) struct SplitSchedule {
    policy: SplitPolicy,
    quota: usize,
    done: usize,
}

impl SplitSchedule {
    /// Whether the parent at ring position `position` splits.
    pub(crate) fn should_split(&mut self, position: usize) -> bool {
        if self.done >= self.quota {
            return false;
        }
        let interval = match self.policy {
            SplitPolicy::Hold => return false,
            SplitPolicy::Spread { interval } => interval,
            SplitPolicy::Saturate { threshold } => {
                if self.done <= threshold {
                    2
                } else {
                    1
                }
            }
            SplitPolicy::Double => 1,
        };
        let split = position % interval == 0;
        if split {
            self.done += 1;
        }
        split
    }

    pub(crate) fn splits_done(&self) -> usize {
        self.done
    }
}
