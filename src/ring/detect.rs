//! Finding the cross-section ring a point belongs to.
//!
//! Every 4-cycle through the start point is a candidate. Side quads of the
//! tube are 4-cycles too; they are told apart from true cross-sections by
//! walking all candidates along the tube in lock step until only one still
//! has somewhere to go.

use super::{Ring, RingIterator};
use crate::mesh::{Mesh, PointId};
use crate::options::DecodeOptions;
use log::{debug, info};

/// The oriented ring containing the start point, with walks in both
/// directions along the tube.
#[derive(Debug, Clone)]
pub struct RingSearch<'a> {
    pub root: Ring,
    pub forward: RingIterator<'a>,
    pub backward: Option<RingIterator<'a>>,
}

struct Candidate<'a> {
    root: Ring,
    next_rings: Vec<Ring>,
    walks: Vec<RingIterator<'a>>,
}

/// Returns `None` when `start` is not on an identifiable cross-section.
pub fn find_ring<'a>(
    mesh: &'a Mesh,
    start: PointId,
    options: &DecodeOptions,
) -> Option<RingSearch<'a>> {
    let mut candidates: Vec<Candidate<'a>> = ring_candidates(mesh, start)
        .into_iter()
        .filter_map(|root| {
            let next_rings = root.find_neighbours(mesh, None);
            if next_rings.is_empty() {
                return None;
            }
            let walks = next_rings
                .iter()
                .map(|&next| RingIterator::new(mesh, next, root))
                .collect();
            Some(Candidate {
                root,
                next_rings,
                walks,
            })
        })
        .collect();

    if candidates.iter().any(|c| c.root.is_chordless(mesh)) {
        candidates.retain(|c| c.root.is_chordless(mesh));
    }
    debug!("{} ring candidate(s) at point {}", candidates.len(), start.index());

    let mut budget = options.disambiguation_rounds;
    let winner = loop {
        budget = budget.saturating_sub(1);
        if budget == 0 {
            debug!("Ring candidates still ambiguous at point {}", start.index());
            return None;
        }
        match candidates.len() {
            0 => return None,
            1 => break candidates.swap_remove(0),
            _ => {}
        }

        for candidate in &mut candidates {
            candidate.walks.retain_mut(|walk| walk.next().is_some());
        }
        candidates.retain(|c| !c.walks.is_empty());
    };

    let mut root = winner.root;
    let mut next_rings = winner.next_rings;

    if root.align_facing_up(mesh, &next_rings) {
        info!("Start ring aligned using VMAP TXUV information");
    } else {
        root.align_maximum_up(mesh);
        info!("Start ring aligned using maximum Y-coordinate");
    }

    if !next_rings[0].align(mesh, &root) {
        return None;
    }
    let first_next = next_rings[0];
    root.align_front(mesh, &first_next);
    for next in &mut next_rings {
        if !next.align(mesh, &root) {
            return None;
        }
    }

    let forward = RingIterator::new(mesh, next_rings[0], root);
    let backward = next_rings
        .get(1)
        .map(|&next| RingIterator::new(mesh, next, root));
    Some(RingSearch {
        root,
        forward,
        backward,
    })
}

/// All 4-cycles through `p0`, each listed once regardless of direction.
fn ring_candidates(mesh: &Mesh, p0: PointId) -> Vec<Ring> {
    let mut rings: Vec<Ring> = Vec::new();
    for &p1 in mesh.neighbours(p0) {
        for &p2 in mesh.neighbours(p1) {
            if p2 == p0 {
                continue;
            }
            for &p3 in mesh.neighbours(p2) {
                if p3 == p0 || p3 == p1 || !mesh.is_neighbour(p3, p0) {
                    continue;
                }
                if rings
                    .iter()
                    .any(|r| r.is_same_points_reversed(p0, p1, p2, p3))
                {
                    continue;
                }
                rings.push(Ring::new([p0, p1, p2, p3]));
            }
        }
    }
    rings
}
