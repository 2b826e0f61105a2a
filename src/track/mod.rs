//! Track assembly and arc-length walking.
//!
//! A track is the ordered ring sequence of one tube, the straight ring pairs
//! between consecutive rings, and whether the tube closes on itself.

mod chain;
mod interpolate;

pub use chain::RingPair;
pub use interpolate::{PathInterpolator, PathSample};

use crate::error::{Error, TopologyError};
use crate::mesh::{Mesh, PointId};
use crate::options::DecodeOptions;
use crate::ring::{find_ring, Ring};
use interpolate::check_step;
use log::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub rings: Vec<Ring>,
    pub chains: Vec<RingPair>,
    pub looped: bool,
    pub total_length: f32,
}

impl Track {
    /// Assembles the track through the ring containing `start`.
    pub fn decode_rings(
        mesh: &Mesh,
        start: PointId,
        options: &DecodeOptions,
    ) -> Result<Self, TopologyError> {
        let not_a_tube = TopologyError::NotATube { point: start };
        let search = find_ring(mesh, start, options).ok_or_else(|| not_a_tube.clone())?;
        let root = search.root;
        // Each ring owns four points, so a longer walk is going in circles
        let max_rings = mesh.point_count();

        let mut rings = vec![root];
        let mut looped = false;
        for next in search.forward {
            if next.is_same_points(&root) {
                info!("Reached loop at {}", next.describe(mesh));
                looped = true;
                break;
            }
            if rings.len() >= max_rings {
                warn!("Ring walk from point {} does not terminate", start.index());
                return Err(not_a_tube);
            }
            rings.push(next);
        }

        if !looped {
            if let Some(backward) = search.backward {
                let last = rings[rings.len() - 1];
                let mut previous = Vec::new();
                for next in backward {
                    if next.is_same_points(&last) {
                        info!("Reached loop at {}", next.describe(mesh));
                        looped = true;
                        break;
                    }
                    if rings.len() + previous.len() >= max_rings {
                        warn!("Ring walk from point {} does not terminate", start.index());
                        return Err(not_a_tube);
                    }
                    previous.push(next);
                }
                previous.reverse();
                previous.append(&mut rings);
                rings = previous;
            }
        }

        let track = Self::from_rings(mesh, rings, looped);
        info!(
            "Decoded {} rings, looped = {}, length = {}",
            track.rings.len(),
            track.looped,
            track.total_length
        );
        if let (Some(first), Some(last)) = (track.rings.first(), track.rings.last()) {
            debug!("Start ring {}", first.describe_frame(mesh));
            debug!("End ring {}", last.describe_frame(mesh));
        }
        Ok(track)
    }

    /// Links consecutive rings into pairs. A looped track gets a closing
    /// pair from the last ring back to the first.
    pub fn from_rings(mesh: &Mesh, rings: Vec<Ring>, looped: bool) -> Self {
        let mut chains: Vec<RingPair> = rings
            .windows(2)
            .map(|w| RingPair::new(mesh, &w[0], &w[1], false))
            .collect();
        if looped && rings.len() > 1 {
            chains.push(RingPair::new(mesh, &rings[rings.len() - 1], &rings[0], true));
        }

        let count = chains.len();
        for (i, pair) in chains.iter_mut().enumerate() {
            pair.next = (i + 1 < count).then_some(i + 1);
        }
        let total_length = chains.iter().map(|c| c.distance).sum();

        Self {
            rings,
            chains,
            looped,
            total_length,
        }
    }

    pub fn interpolate(&self) -> PathInterpolator<'_> {
        PathInterpolator::new(&self.chains)
    }

    /// Walks the whole track in steps of `step`, first sample included.
    pub fn resample(&self, step: f32) -> Result<Vec<PathSample>, Error> {
        check_step(step)?;
        let mut path = self.interpolate();
        let mut samples: Vec<PathSample> = path.first().into_iter().collect();
        while let Some(sample) = path.next(step)? {
            samples.push(sample);
        }
        Ok(samples)
    }

    /// One sample per ring, straight from the ring geometry.
    pub fn ring_samples<'a>(&'a self, mesh: &'a Mesh) -> impl Iterator<Item = PathSample> + 'a {
        self.rings.iter().map(move |ring| {
            PathSample::new(
                ring.pos(mesh),
                ring.front(mesh),
                ring.left(mesh),
                ring.up(mesh),
            )
        })
    }
}

/// Points already claimed by an assembled track.
#[derive(Debug, Clone)]
pub struct VisitedPoints {
    visited: Vec<bool>,
}

impl VisitedPoints {
    pub fn new(mesh: &Mesh) -> Self {
        Self {
            visited: vec![false; mesh.point_count()],
        }
    }

    pub fn contains(&self, point: PointId) -> bool {
        self.visited.get(point.index()).copied().unwrap_or(false)
    }

    pub fn insert(&mut self, point: PointId) {
        if let Some(slot) = self.visited.get_mut(point.index()) {
            *slot = true;
        }
    }

    pub fn mark_track(&mut self, track: &Track) {
        for ring in &track.rings {
            for &point in ring.points() {
                self.insert(point);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.visited.iter().filter(|&&v| v).count()
    }
}

/// Assembles a track for every point not yet covered by one.
pub fn discover_tracks(mesh: &Mesh, options: &DecodeOptions) -> Result<Vec<Track>, TopologyError> {
    let mut visited = VisitedPoints::new(mesh);
    discover_tracks_with(mesh, options, &mut visited)
}

/// Like [`discover_tracks`], skipping and updating the caller's `visited`.
pub fn discover_tracks_with(
    mesh: &Mesh,
    options: &DecodeOptions,
    visited: &mut VisitedPoints,
) -> Result<Vec<Track>, TopologyError> {
    let mut tracks = Vec::new();
    for point in mesh.point_ids() {
        if visited.contains(point) {
            continue;
        }
        let track = Track::decode_rings(mesh, point, options)?;
        visited.mark_track(&track);
        tracks.push(track);
    }
    Ok(tracks)
}
