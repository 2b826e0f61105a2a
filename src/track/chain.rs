use super::PathSample;
use crate::math::{Float3, Quaternion};
use crate::mesh::Mesh;
use crate::ring::Ring;

/// Straight segment between two consecutive rings. Positions and
/// orientations are snapshots taken when the track is assembled.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RingPair {
    pub pos0: Float3,
    pub pos1: Float3,
    pub ori0: Quaternion,
    pub ori1: Quaternion,
    pub distance: f32,
    /// Set on the pair closing a loop; its end is the track's first sample.
    pub exclude_end: bool,
    /// Index of the following pair in the owning track.
    pub next: Option<usize>,
}

impl RingPair {
    pub fn new(mesh: &Mesh, from: &Ring, to: &Ring, exclude_end: bool) -> Self {
        let pos0 = from.pos(mesh);
        let pos1 = to.pos(mesh);
        Self {
            pos0,
            pos1,
            ori0: from.orientation(mesh),
            ori1: to.orientation(mesh),
            distance: pos0.distance(pos1),
            exclude_end,
            next: None,
        }
    }

    pub fn first(&self) -> PathSample {
        PathSample::from_orientation(self.pos0, self.ori0)
    }

    pub fn last(&self) -> PathSample {
        PathSample::from_orientation(self.pos1, self.ori1)
    }

    /// Sample `distance_traveled` along the pair, clamped to its ends.
    pub fn interpolate(&self, distance_traveled: f32) -> PathSample {
        let t = if self.distance > 0.0 {
            (distance_traveled / self.distance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        PathSample::from_orientation(
            self.pos0.lerp(self.pos1, t),
            Quaternion::slerp(self.ori0, self.ori1, t),
        )
    }
}
