use super::RingPair;
use crate::error::Error;
use crate::math::{Float3, Quaternion};

/// Position and orientation at a point along a track.
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathSample {
    pub position: Float3,
    pub front: Float3,
    pub left: Float3,
    pub up: Float3,
}

impl PathSample {
    pub const fn new(position: Float3, front: Float3, left: Float3, up: Float3) -> Self {
        Self {
            position,
            front,
            left,
            up,
        }
    }

    pub fn from_orientation(position: Float3, orientation: Quaternion) -> Self {
        Self::new(
            position,
            orientation.front(),
            orientation.left(),
            orientation.up(),
        )
    }

    pub const DEFAULT: Self = Self::new(Float3::ZERO, Float3::FRONT, Float3::LEFT, Float3::UP);
}

impl Default for PathSample {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub(crate) fn check_step(step: f32) -> Result<(), Error> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "step must be positive and finite, got {step}"
        )))
    }
}

/// Cursor walking a chain of ring pairs in arc-length steps.
///
/// A track end yields its final frame once. A loop stops before wrapping
/// onto the first sample again.
#[derive(Debug, Clone)]
pub struct PathInterpolator<'a> {
    chains: &'a [RingPair],
    current: Option<usize>,
    offset: f32,
}

impl<'a> PathInterpolator<'a> {
    pub fn new(chains: &'a [RingPair]) -> Self {
        Self {
            chains,
            current: (!chains.is_empty()).then_some(0),
            offset: 0.0,
        }
    }

    /// Start frame of the path.
    pub fn first(&self) -> Option<PathSample> {
        self.chains.first().map(RingPair::first)
    }

    /// Advances `step` along the path. `Ok(None)` once the path is done.
    pub fn next(&mut self, step: f32) -> Result<Option<PathSample>, Error> {
        check_step(step)?;

        let mut remaining = step;
        while let Some(index) = self.current {
            let pair = &self.chains[index];
            if self.offset + remaining < pair.distance {
                self.offset += remaining;
                return Ok(Some(pair.interpolate(self.offset)));
            }

            if pair.exclude_end {
                self.current = None;
                return Ok(None);
            }
            match pair.next {
                None => {
                    self.current = None;
                    return Ok(Some(pair.last()));
                }
                Some(next) => {
                    remaining -= pair.distance - self.offset;
                    self.offset = 0.0;
                    self.current = Some(next);
                }
            }
        }
        Ok(None)
    }

    pub fn is_done(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segment(z0: f32, z1: f32, next: Option<usize>, exclude_end: bool) -> RingPair {
        RingPair {
            pos0: Float3::new(0.0, 0.0, z0),
            pos1: Float3::new(0.0, 0.0, z1),
            ori0: Quaternion::IDENTITY,
            ori1: Quaternion::IDENTITY,
            distance: (z1 - z0).abs(),
            exclude_end,
            next,
        }
    }

    #[test]
    fn crosses_pairs_and_ends_on_last_frame() {
        let chains = [segment(0.0, 1.0, Some(1), false), segment(1.0, 3.0, None, false)];
        let mut path = PathInterpolator::new(&chains);
        assert_relative_eq!(path.first().unwrap().position.z, 0.0);

        let z: Vec<f32> = std::iter::from_fn(|| path.next(0.75).unwrap())
            .map(|s| s.position.z)
            .collect();
        assert_eq!(z.len(), 4);
        assert_relative_eq!(z[0], 0.75, epsilon = 1e-6);
        assert_relative_eq!(z[1], 1.5, epsilon = 1e-6);
        assert_relative_eq!(z[2], 2.25, epsilon = 1e-6);
        assert_relative_eq!(z[3], 3.0);

        assert!(path.is_done());
        assert_eq!(path.next(0.75).unwrap(), None);
    }

    #[test]
    fn loop_closing_pair_excludes_end() {
        let chains = [segment(0.0, 1.0, Some(1), false), segment(1.0, 0.0, None, true)];
        let mut path = PathInterpolator::new(&chains);
        assert!(path.next(1.5).unwrap().is_some());
        assert_eq!(path.next(0.5).unwrap(), None);
        assert_eq!(path.next(0.5).unwrap(), None);
    }

    #[test]
    fn zero_length_pairs_are_skipped() {
        let chains = [segment(0.0, 0.0, Some(1), false), segment(0.0, 2.0, None, false)];
        let mut path = PathInterpolator::new(&chains);
        let sample = path.next(0.5).unwrap().unwrap();
        assert_relative_eq!(sample.position.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn rejects_bad_steps() {
        let chains = [segment(0.0, 1.0, None, false)];
        let mut path = PathInterpolator::new(&chains);
        for step in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(path.next(step), Err(Error::InvalidArgument(_))));
        }
        assert!(!path.is_done());
    }

    #[test]
    fn empty_chain_has_nothing() {
        let mut path = PathInterpolator::new(&[]);
        assert_eq!(path.first(), None);
        assert_eq!(path.next(1.0).unwrap(), None);
    }

    #[test]
    fn default_sample_is_identity_frame() {
        let sample = PathSample::default();
        let q = Quaternion::IDENTITY;
        assert_eq!(sample, PathSample::from_orientation(Float3::ZERO, q));
    }
}
